use crate::error::ReferenceError;
use crate::model::{Flow, FlowGraph, Template};
use tracing::info;

/// The result of migrating a flow onto a newer template version.
#[derive(Debug, Clone, PartialEq)]
pub struct Resync {
    pub flow: Flow,
    pub from_version: u32,
    pub to_version: u32,
    pub added_nodes: Vec<String>,
    pub added_edges: Vec<String>,
    pub added_blocks: Vec<String>,
    pub removed_nodes: Vec<String>,
    pub removed_edges: Vec<String>,
    /// Blocks the template no longer has. Their data is gone from the flow.
    pub removed_blocks: Vec<String>,
}

impl Resync {
    pub fn is_noop(&self) -> bool {
        self.added_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.added_blocks.is_empty()
            && self.removed_nodes.is_empty()
            && self.removed_edges.is_empty()
            && self.removed_blocks.is_empty()
    }
}

/// Migrates `flow` onto the current structure of `template`.
///
/// The flow adopts the template's set of nodes, edges and blocks. Elements
/// present on both sides keep the flow's copy (positions, sizes, block data);
/// elements only the template has are appended and new blocks are seeded from
/// the template's default data. Elements the template no longer has, including
/// ones a collaborator added, are dropped together with their block data and
/// reported. This never runs implicitly.
pub fn resync_flow(flow: &Flow, template: &Template) -> Result<Resync, ReferenceError> {
    if flow.template_id() != template.id {
        return Err(ReferenceError::TemplateNotFound(flow.template_id().to_string()));
    }

    let current = &flow.graph;
    let target = &template.graph;
    let mut graph = FlowGraph::default();
    let mut added_nodes = Vec::new();
    let mut added_edges = Vec::new();
    let mut added_blocks = Vec::new();

    for node in &target.nodes {
        match current.node(&node.id) {
            Some(kept) => graph.nodes.push(kept.clone()),
            None => {
                added_nodes.push(node.id.clone());
                graph.nodes.push(node.clone());
            }
        }
    }

    for edge in &target.edges {
        match current.edge(&edge.id) {
            Some(kept) => graph.edges.push(kept.clone()),
            None => {
                added_edges.push(edge.id.clone());
                graph.edges.push(edge.clone());
            }
        }
    }

    let mut blocks = flow.blocks.clone();
    blocks.retain(|block_id, _| target.find_block(block_id).is_some());
    for (node_id, template_blocks) in &target.blocks_by_node {
        let slot = graph.blocks_by_node.entry(node_id.clone()).or_default();
        for block in template_blocks {
            match current.find_block(&block.id) {
                Some((_, kept)) => slot.push(kept.clone()),
                None => {
                    added_blocks.push(block.id.clone());
                    slot.push(block.clone());
                    if let Some(seed) = template.default_data.get(&block.id) {
                        blocks.entry(block.id.clone()).or_insert_with(|| seed.clone());
                    }
                }
            }
        }
    }

    let removed_nodes: Vec<String> = current
        .nodes
        .iter()
        .filter(|n| target.node(&n.id).is_none())
        .map(|n| n.id.clone())
        .collect();
    let removed_edges: Vec<String> = current
        .edges
        .iter()
        .filter(|e| target.edge(&e.id).is_none())
        .map(|e| e.id.clone())
        .collect();
    let removed_blocks: Vec<String> = current
        .blocks()
        .filter(|(_, b)| target.find_block(&b.id).is_none())
        .map(|(_, b)| b.id.clone())
        .collect();

    info!(
        flow_id = %flow.id,
        from = flow.template_version,
        to = template.version,
        added = added_nodes.len() + added_edges.len() + added_blocks.len(),
        removed = removed_nodes.len() + removed_edges.len() + removed_blocks.len(),
        "re-synchronised flow"
    );

    Ok(Resync {
        flow: flow.migrated(graph, blocks, template.version),
        from_version: flow.template_version,
        to_version: template.version,
        added_nodes,
        added_edges,
        added_blocks,
        removed_nodes,
        removed_edges,
        removed_blocks,
    })
}
