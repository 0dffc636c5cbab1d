//! Flow-scoped constraints over the shared configuration blocks of a flow, and
//! impact analysis for changes to blocks that other blocks depend on.
//!
//! Constraints are evaluated over the blocks of the flow's single configuration
//! node:
//!
//! - at most one image block may carry visual elements (object or text overlays);
//! - every integration block shares one integration type and, when that type
//!   needs one, one sub-kind;
//! - a second media block may only sit next to an integration when the shared
//!   sub-kind is on the dual-asset allow-list.
//!
//! Violations are reported as a [`Validation`], never as a panic or an error
//! that unwinds through the caller.

mod confirm;
pub mod fields;
mod impact;

pub use confirm::{
    ChangeOutcome, ConfirmationGate, Decision, confirm_change, remove_shared_block,
    reset_affected_blocks,
};
pub use impact::{AffectedBlock, ChangeKind, FieldReset, ImpactAnalysis, ResetAction};

use crate::model::{Block, BlockKind, FlowGraph, Validation};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstraintConfig {
    /// Integration types that must also name a sub-kind.
    pub types_requiring_sub_kind: Vec<String>,
    /// Sub-kinds that allow a second media block next to the integration.
    pub dual_asset_sub_kinds: Vec<String>,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            types_requiring_sub_kind: vec!["crm".to_string(), "messaging".to_string()],
            dual_asset_sub_kinds: vec!["whatsapp".to_string(), "carousel".to_string()],
        }
    }
}

/// The integration configuration every integration block of a flow shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationProfile {
    pub integration_type: String,
    pub sub_kind: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConstraintEngine {
    config: ConstraintConfig,
}

impl ConstraintEngine {
    pub fn new(config: ConstraintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    /// Checks the current configuration blocks. Never mutates.
    pub fn validate(&self, graph: &FlowGraph) -> Validation {
        self.check(graph.configuration_blocks())
    }

    /// Checks the configuration blocks as they would be after adding `candidate`.
    pub fn validate_addition(&self, graph: &FlowGraph, candidate: &Block) -> Validation {
        let mut blocks = graph.configuration_blocks().to_vec();
        let mut errors = Vec::new();
        if graph.find_block(&candidate.id).is_some() {
            errors.push(format!("block id '{}' is already in use", candidate.id));
        }
        blocks.push(candidate.clone());
        errors.extend(self.check(&blocks).errors);
        Validation::from_errors(errors)
    }

    /// The integration type and sub-kind of the first integration block, if any.
    pub fn shared_integration(&self, graph: &FlowGraph) -> Option<IntegrationProfile> {
        profile_of(graph.configuration_blocks())
    }

    /// `true` only when the shared integration sub-kind is on the allow-list.
    pub fn dual_asset_allowed(&self, graph: &FlowGraph) -> bool {
        self.allows_dual_asset(profile_of(graph.configuration_blocks()).as_ref())
    }

    pub fn analyze_change_impact(
        &self,
        graph: &FlowGraph,
        block_id: &str,
        change: ChangeKind,
    ) -> ImpactAnalysis {
        impact::analyze_change_impact(graph, block_id, change)
    }

    fn allows_dual_asset(&self, profile: Option<&IntegrationProfile>) -> bool {
        profile
            .and_then(|p| p.sub_kind.as_ref())
            .is_some_and(|sub_kind| self.config.dual_asset_sub_kinds.contains(sub_kind))
    }

    fn check(&self, blocks: &[Block]) -> Validation {
        let mut errors = Vec::new();

        let carriers: Vec<&str> = blocks
            .iter()
            .filter(|b| fields::has_visual_elements(b))
            .map(|b| b.id.as_str())
            .collect();
        if carriers.len() > 1 {
            errors.push(format!(
                "only one image block may carry visual elements, found {} ({})",
                carriers.len(),
                carriers.iter().map(|id| format!("'{}'", id)).join(", ")
            ));
        }

        let integrations: Vec<&Block> = blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Integration)
            .collect();

        for block in &integrations {
            match block.str_field(fields::INTEGRATION_TYPE) {
                None => errors.push(format!(
                    "integration block '{}' has no integration type",
                    block.id
                )),
                Some(kind)
                    if self.config.types_requiring_sub_kind.iter().any(|t| t == kind)
                        && block.str_field(fields::INTEGRATION_SUB_KIND).is_none() =>
                {
                    errors.push(format!(
                        "integration block '{}' of type '{}' requires a sub-kind",
                        block.id, kind
                    ))
                }
                Some(_) => {}
            }
        }

        let types: Vec<&str> = integrations
            .iter()
            .filter_map(|b| b.str_field(fields::INTEGRATION_TYPE))
            .unique()
            .collect();
        if types.len() > 1 {
            errors.push(format!(
                "all integration blocks must share one integration type, found {}",
                types.join(", ")
            ));
        }

        let sub_kinds: Vec<&str> = integrations
            .iter()
            .filter_map(|b| b.str_field(fields::INTEGRATION_SUB_KIND))
            .unique()
            .collect();
        if sub_kinds.len() > 1 {
            errors.push(format!(
                "all integration blocks must share one sub-kind, found {}",
                sub_kinds.join(", ")
            ));
        }

        if !integrations.is_empty() {
            let media = blocks.iter().filter(|b| b.kind.is_media()).count();
            let profile = profile_of(blocks);
            if media > 1 && !self.allows_dual_asset(profile.as_ref()) {
                errors.push(format!(
                    "integration sub-kind {} does not allow a second media block, found {}",
                    profile
                        .and_then(|p| p.sub_kind)
                        .map(|s| format!("'{}'", s))
                        .unwrap_or_else(|| "(none)".to_string()),
                    media
                ));
            }
        }

        Validation::from_errors(errors)
    }
}

fn profile_of(blocks: &[Block]) -> Option<IntegrationProfile> {
    blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Integration)
        .find_map(|b| {
            b.str_field(fields::INTEGRATION_TYPE)
                .map(|kind| IntegrationProfile {
                    integration_type: kind.to_string(),
                    sub_kind: b.str_field(fields::INTEGRATION_SUB_KIND).map(str::to_string),
                })
        })
}
