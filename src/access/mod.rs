//! The role boundary between administrators, who own the template hierarchy,
//! and collaborators, who own what is instantiated from it.
//!
//! The core never consults the gate itself. Callers sitting at the edge of the
//! engine call [`authorize`] before handing a mutation through.

use crate::error::AccessError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which store a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    /// Templates, groups, sections and blueprints.
    Catalog,
    /// Scripts, setups and flows.
    Workspace,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Catalog => write!(f, "the catalog"),
            Scope::Workspace => write!(f, "the workspace"),
        }
    }
}

pub trait RoleGate {
    fn may_mutate_catalog(&self) -> bool;
    fn may_mutate_workspace(&self) -> bool;

    /// Name reported in [`AccessError`].
    fn role_name(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Administrator,
    Collaborator,
}

impl RoleGate for Role {
    fn may_mutate_catalog(&self) -> bool {
        matches!(self, Role::Administrator)
    }

    /// Administrators may also edit setups and flows on a collaborator's behalf.
    fn may_mutate_workspace(&self) -> bool {
        true
    }

    fn role_name(&self) -> String {
        match self {
            Role::Administrator => "administrator".to_string(),
            Role::Collaborator => "collaborator".to_string(),
        }
    }
}

pub fn authorize<G: RoleGate + ?Sized>(gate: &G, scope: Scope) -> Result<(), AccessError> {
    let allowed = match scope {
        Scope::Catalog => gate.may_mutate_catalog(),
        Scope::Workspace => gate.may_mutate_workspace(),
    };
    if allowed {
        Ok(())
    } else {
        tracing::warn!(role = %gate.role_name(), %scope, "mutation refused");
        Err(AccessError {
            role: gate.role_name(),
            scope: scope.to_string(),
        })
    }
}
