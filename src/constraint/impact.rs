use super::fields;
use crate::model::{Block, BlockKind, FlowGraph};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The kind of change about to be made to a shared block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Remove,
    TypeChange,
    ElementsChange,
}

impl ChangeKind {
    fn verb(self) -> &'static str {
        match self {
            ChangeKind::Remove => "Removing",
            ChangeKind::TypeChange => "Changing the type of",
            ChangeKind::ElementsChange => "Changing the visual elements of",
        }
    }
}

/// How one dependent field is brought back to a valid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResetAction {
    /// Set the field to `null`.
    Clear,
    /// Drop only the list entries whose `blockId` names the changing block.
    RemoveEntries,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReset {
    pub field: String,
    pub action: ResetAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedBlock {
    pub node_id: String,
    pub block_id: String,
    pub kind: BlockKind,
    pub fields: Vec<FieldReset>,
}

/// The blocks a change would invalidate, and exactly which of their fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub block_id: String,
    pub change: ChangeKind,
    pub affected: Vec<AffectedBlock>,
    pub summary: String,
}

impl ImpactAnalysis {
    pub fn is_empty(&self) -> bool {
        self.affected.is_empty()
    }

    pub fn field_count(&self) -> usize {
        self.affected.iter().map(|a| a.fields.len()).sum()
    }
}

/// Scans every block of the graph for data that depends on `block_id`.
pub(super) fn analyze_change_impact(
    graph: &FlowGraph,
    block_id: &str,
    change: ChangeKind,
) -> ImpactAnalysis {
    let affected: Vec<AffectedBlock> = graph
        .blocks()
        .filter(|(_, block)| block.id != block_id)
        .filter_map(|(node_id, block)| {
            let resets = dependent_fields(block, block_id, change);
            (!resets.is_empty()).then(|| AffectedBlock {
                node_id: node_id.to_string(),
                block_id: block.id.clone(),
                kind: block.kind,
                fields: resets,
            })
        })
        .collect();

    let summary = summarize(block_id, change, &affected);
    ImpactAnalysis {
        block_id: block_id.to_string(),
        change,
        affected,
        summary,
    }
}

fn dependent_fields(block: &Block, block_id: &str, change: ChangeKind) -> Vec<FieldReset> {
    let mut resets = Vec::new();
    let mut push = |field: &str, action: ResetAction| {
        resets.push(FieldReset {
            field: field.to_string(),
            action,
        })
    };

    if matches!(change, ChangeKind::Remove | ChangeKind::TypeChange)
        && fields::entries_referencing(block, fields::COLLECTION_METHODS, block_id) > 0
    {
        push(fields::COLLECTION_METHODS, ResetAction::RemoveEntries);
    }

    if fields::points_at(block, fields::ACTION_TARGET, block_id) {
        let has = |field: &str| block.field(field).is_some();
        match change {
            ChangeKind::Remove => {
                push(fields::ACTION_TARGET, ResetAction::Clear);
                if has(fields::ACTION_METHOD) {
                    push(fields::ACTION_METHOD, ResetAction::Clear);
                }
                if has(fields::ACTION_ELEMENT_ID) {
                    push(fields::ACTION_ELEMENT_ID, ResetAction::Clear);
                }
            }
            ChangeKind::TypeChange if has(fields::ACTION_METHOD) => {
                push(fields::ACTION_METHOD, ResetAction::Clear);
            }
            ChangeKind::ElementsChange if has(fields::ACTION_ELEMENT_ID) => {
                push(fields::ACTION_ELEMENT_ID, ResetAction::Clear);
            }
            _ => {}
        }
    }

    if fields::entries_referencing(block, fields::PREDEFINED_CONDITIONS, block_id) > 0 {
        push(fields::PREDEFINED_CONDITIONS, ResetAction::RemoveEntries);
    }

    if change == ChangeKind::Remove && fields::points_at(block, fields::SELECTED_ASSET_ID, block_id)
    {
        push(fields::SELECTED_ASSET_ID, ResetAction::Clear);
    }

    resets
}

fn summarize(block_id: &str, change: ChangeKind, affected: &[AffectedBlock]) -> String {
    if affected.is_empty() {
        return format!("No blocks depend on block '{}'.", block_id);
    }
    let fields: usize = affected.iter().map(|a| a.fields.len()).sum();
    let details = affected
        .iter()
        .map(|a| {
            format!(
                "'{}' ({})",
                a.block_id,
                a.fields.iter().map(|f| f.field.as_str()).join(", ")
            )
        })
        .join("; ");
    format!(
        "{} block '{}' will reset {} field(s) on {} block(s): {}.",
        change.verb(),
        block_id,
        fields,
        affected.len(),
        details
    )
}
