use crate::model::{BlockKind, Edge, EdgeBranch, FlowGraph};
use ahash::AHashMap;

/// Condition blocks indexed by block id, so connecting an edge does not have to
/// scan every node for the block its source handle names.
#[derive(Debug, Clone, Default)]
pub(super) struct BranchIndex {
    conditions: AHashMap<String, (String, EdgeBranch)>,
}

impl BranchIndex {
    pub(super) fn build(graph: &FlowGraph) -> Self {
        let conditions = graph
            .blocks()
            .filter(|(_, block)| block.kind == BlockKind::Condition)
            .map(|(node_id, block)| {
                let branch = EdgeBranch {
                    block_id: block.id.clone(),
                    label: block.str_field("label").map(str::to_string),
                    expression: block.str_field("expression").map(str::to_string),
                };
                (block.id.clone(), (node_id.to_string(), branch))
            })
            .collect();
        Self { conditions }
    }

    /// Branch metadata for an edge whose source handle names a condition block
    /// held by the edge's source node.
    pub(super) fn branch_for(&self, edge: &Edge) -> Option<EdgeBranch> {
        let handle = edge.source_handle.as_deref()?;
        self.conditions
            .get(handle)
            .filter(|(node_id, _)| *node_id == edge.source)
            .map(|(_, branch)| branch.clone())
    }
}
