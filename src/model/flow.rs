use super::graph::FlowGraph;
use super::ids::{Timestamp, new_id, now};
use super::template::Template;
use super::validation::{Checker, Validate, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A freely editable snapshot of one template use inside a setup.
///
/// The template reference (`template_id`, `template_name`, `instance_id`) is
/// permanent metadata and is only readable. `graph` is the template's shape as
/// it was at instantiation time and `blocks` holds collaborator-entered data
/// keyed by block id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    pub setup_id: String,
    pub group_id: String,
    template_id: String,
    template_name: String,
    instance_id: String,
    #[serde(default = "first_version")]
    pub template_version: u32,
    #[serde(default)]
    pub graph: FlowGraph,
    #[serde(default)]
    pub blocks: BTreeMap<String, Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn first_version() -> u32 {
    1
}

#[derive(Debug, Clone, Default)]
pub struct FlowDraft {
    pub id: Option<String>,
    pub setup_id: Option<String>,
    pub group_id: Option<String>,
    pub template_id: Option<String>,
    pub template_name: Option<String>,
    pub instance_id: Option<String>,
    pub template_version: Option<u32>,
    pub graph: Option<FlowGraph>,
    pub blocks: Option<BTreeMap<String, Value>>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Flow {
    pub fn create(draft: FlowDraft) -> Self {
        let stamp = now();
        Self {
            id: draft.id.unwrap_or_else(new_id),
            setup_id: draft.setup_id.unwrap_or_default(),
            group_id: draft.group_id.unwrap_or_default(),
            template_id: draft.template_id.unwrap_or_default(),
            template_name: draft.template_name.unwrap_or_default(),
            instance_id: draft.instance_id.unwrap_or_default(),
            template_version: draft.template_version.unwrap_or(1),
            graph: draft.graph.unwrap_or_default(),
            blocks: draft.blocks.unwrap_or_default(),
            created_at: draft.created_at.unwrap_or(stamp),
            updated_at: draft.updated_at.unwrap_or(stamp),
        }
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// The template changed structurally after this flow was created.
    pub fn is_stale(&self, template: &Template) -> bool {
        template.id == self.template_id && self.template_version < template.version
    }

    #[must_use]
    pub fn with_block_data(&self, block_id: impl Into<String>, data: Value) -> Self {
        let mut next = self.clone();
        next.blocks.insert(block_id.into(), data);
        next.updated_at = now();
        next
    }

    /// Replaces the flow's graph, typically with the result of an editing session.
    #[must_use]
    pub fn with_graph(&self, graph: FlowGraph) -> Self {
        let mut next = self.clone();
        next.graph = graph;
        next.updated_at = now();
        next
    }

    /// Installs a migrated structure. Only re-synchronisation calls this.
    pub(crate) fn migrated(
        &self,
        graph: FlowGraph,
        blocks: BTreeMap<String, Value>,
        template_version: u32,
    ) -> Self {
        Self {
            graph,
            blocks,
            template_version,
            updated_at: now(),
            ..self.clone()
        }
    }
}

impl Validate for Flow {
    fn validate(&self) -> Validation {
        Checker::new()
            .non_empty("flow id", &self.id)
            .non_empty("flow setup id", &self.setup_id)
            .non_empty("flow group id", &self.group_id)
            .non_empty("flow template id", &self.template_id)
            .non_empty("flow instance id", &self.instance_id)
            .finish()
            .merge("flow graph", self.graph.validate())
    }
}
