use super::ids::{Timestamp, new_id, now};
use super::validation::{Checker, Validate, Validation};
use crate::error::StructureError;
use crate::ledger::{self, Positioned};
use serde::{Deserialize, Serialize};

/// A setup-local group. `original_group_id` points back at the blueprint group it
/// was copied from and is `None` for groups a collaborator added later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupGroup {
    pub group_id: String,
    pub group_name: String,
    #[serde(default)]
    original_group_id: Option<String>,
    pub position: usize,
    #[serde(default)]
    pub flow_ids: Vec<String>,
}

impl SetupGroup {
    pub(crate) fn copied_from(
        group_id: impl Into<String>,
        original_group_id: impl Into<String>,
        group_name: impl Into<String>,
        position: usize,
        flow_ids: Vec<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            group_name: group_name.into(),
            original_group_id: Some(original_group_id.into()),
            position,
            flow_ids,
        }
    }

    pub fn original_group_id(&self) -> Option<&str> {
        self.original_group_id.as_deref()
    }
}

impl Positioned for SetupGroup {
    fn position(&self) -> usize {
        self.position
    }
    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

/// An independent, freely editable snapshot of one blueprint.
///
/// The audit back-reference to the blueprint is fixed at creation and has no
/// setter; nothing done to a setup is ever written back to its blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub id: String,
    pub script_id: String,
    pub section_id: String,
    original_blueprint_id: String,
    #[serde(default)]
    pub groups: Vec<SetupGroup>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct SetupDraft {
    pub id: Option<String>,
    pub script_id: Option<String>,
    pub section_id: Option<String>,
    pub original_blueprint_id: Option<String>,
    pub groups: Option<Vec<SetupGroup>>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Setup {
    pub fn create(draft: SetupDraft) -> Self {
        let stamp = now();
        Self {
            id: draft.id.unwrap_or_else(new_id),
            script_id: draft.script_id.unwrap_or_default(),
            section_id: draft.section_id.unwrap_or_default(),
            original_blueprint_id: draft.original_blueprint_id.unwrap_or_default(),
            groups: draft.groups.unwrap_or_default(),
            created_at: draft.created_at.unwrap_or(stamp),
            updated_at: draft.updated_at.unwrap_or(stamp),
        }
    }

    pub fn original_blueprint_id(&self) -> &str {
        &self.original_blueprint_id
    }

    pub fn group(&self, group_id: &str) -> Option<&SetupGroup> {
        self.groups.iter().find(|g| g.group_id == group_id)
    }

    /// Flow ids in group order, then in order within each group.
    pub fn flow_ids(&self) -> Vec<&str> {
        let mut groups: Vec<_> = self.groups.iter().collect();
        groups.sort_by_key(|g| g.position);
        groups
            .into_iter()
            .flat_map(|g| g.flow_ids.iter().map(String::as_str))
            .collect()
    }

    /// Adds an empty collaborator-created group. A known group id is a no-op.
    #[must_use]
    pub fn add_group(
        &self,
        group_id: impl Into<String>,
        group_name: impl Into<String>,
        position: usize,
    ) -> Self {
        let group_id = group_id.into();
        if self.group(&group_id).is_some() {
            return self.clone();
        }
        let group = SetupGroup {
            group_id,
            group_name: group_name.into(),
            original_group_id: None,
            position,
            flow_ids: Vec::new(),
        };
        self.with_groups(ledger::insert_at(self.groups.clone(), group, position))
    }

    #[must_use]
    pub fn remove_group(&self, group_id: &str) -> Self {
        self.with_groups(ledger::remove_and_compact(self.groups.clone(), |g| {
            g.group_id == group_id
        }))
    }

    pub fn reorder_groups(&self, from: usize, to: usize) -> Result<Self, StructureError> {
        let groups = ledger::reorder(self.groups.clone(), from, to)?;
        Ok(self.with_groups(groups))
    }

    pub fn attach_flow(
        &self,
        group_id: &str,
        flow_id: impl Into<String>,
    ) -> Result<Self, StructureError> {
        let mut next = self.clone();
        let group = next
            .groups
            .iter_mut()
            .find(|g| g.group_id == group_id)
            .ok_or_else(|| StructureError::MissingChild {
                parent_id: self.id.clone(),
                child_id: group_id.to_string(),
            })?;
        group.flow_ids.push(flow_id.into());
        next.updated_at = now();
        Ok(next)
    }

    #[must_use]
    pub fn detach_flow(&self, flow_id: &str) -> Self {
        let mut next = self.clone();
        for group in &mut next.groups {
            group.flow_ids.retain(|id| id != flow_id);
        }
        next.updated_at = now();
        next
    }

    fn with_groups(&self, groups: Vec<SetupGroup>) -> Self {
        Self {
            groups,
            updated_at: now(),
            ..self.clone()
        }
    }
}

impl Validate for Setup {
    fn validate(&self) -> Validation {
        let mut check = Checker::new();
        check
            .non_empty("setup id", &self.id)
            .non_empty("setup script id", &self.script_id)
            .non_empty("setup original blueprint id", &self.original_blueprint_id)
            .dense("setup groups", &self.groups)
            .unique("setup groups", self.groups.iter().map(|g| g.group_id.as_str()))
            .unique(
                "setup flows",
                self.groups
                    .iter()
                    .flat_map(|g| &g.flow_ids)
                    .map(String::as_str),
            );
        for group in &self.groups {
            check.non_empty("setup group id", &group.group_id);
        }
        check.finish()
    }
}
