use super::graph::FlowGraph;
use super::ids::{Timestamp, new_id, now};
use super::validation::{Checker, Validate, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// An administrator-authored, reusable node/edge/block pattern.
///
/// Templates are never edited through their instances: a [`Flow`](super::Flow)
/// holds its own copy of the graph shape and data taken at instantiation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub graph: FlowGraph,
    /// Initial block data keyed by block id, copied into every new flow.
    #[serde(default)]
    pub default_data: BTreeMap<String, Value>,
    pub version: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial template data accepted by [`Template::create`].
#[derive(Debug, Clone, Default)]
pub struct TemplateDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub graph: Option<FlowGraph>,
    pub default_data: Option<BTreeMap<String, Value>>,
    pub version: Option<u32>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Template {
    pub fn create(draft: TemplateDraft) -> Self {
        let stamp = now();
        Self {
            id: draft.id.unwrap_or_else(new_id),
            name: draft.name.unwrap_or_default(),
            description: draft.description,
            graph: draft.graph.unwrap_or_default(),
            default_data: draft.default_data.unwrap_or_default(),
            version: draft.version.unwrap_or(1),
            created_at: draft.created_at.unwrap_or(stamp),
            updated_at: draft.updated_at.unwrap_or(stamp),
        }
    }

    /// Replaces the node/edge/block structure and bumps `version`.
    ///
    /// Default data for blocks that no longer exist is dropped.
    #[must_use]
    pub fn with_structure(&self, graph: FlowGraph) -> Self {
        let mut next = self.clone();
        next.default_data
            .retain(|block_id, _| graph.find_block(block_id).is_some());
        next.graph = graph;
        next.version = self.version + 1;
        next.updated_at = now();
        next
    }

    #[must_use]
    pub fn with_default_data(&self, block_id: impl Into<String>, data: Value) -> Self {
        let mut next = self.clone();
        next.default_data.insert(block_id.into(), data);
        next.updated_at = now();
        next
    }

    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.name = name.into();
        next.updated_at = now();
        next
    }
}

impl Validate for Template {
    fn validate(&self) -> Validation {
        let mut check = Checker::new();
        check.non_empty("template id", &self.id);
        check.non_empty("template name", &self.name);
        if self.version == 0 {
            check.push("template version must be at least 1".to_string());
        }
        for block_id in self.default_data.keys() {
            if self.graph.find_block(block_id).is_none() {
                check.push(format!(
                    "default data references missing block '{}'",
                    block_id
                ));
            }
        }
        check.finish().merge("graph", self.graph.validate())
    }
}
