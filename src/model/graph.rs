use super::validation::{Checker, Validate, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `node_type` of the single node that carries a flow's shared configuration blocks.
pub const CONFIG_NODE_TYPE: &str = "configNode";

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Measured node dimensions as reported by the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// A node of the editable graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", alias = "nodeType")]
    pub node_type: String,
    #[serde(default)]
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Size>,
    #[serde(default)]
    pub data: Value,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            position,
            label: None,
            dimensions: None,
            data: Value::Null,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.node_type == CONFIG_NODE_TYPE
    }
}

/// Metadata attached to an edge leaving a condition block's branch handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeBranch {
    pub block_id: String,
    pub label: Option<String>,
    pub expression: Option<String>,
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<EdgeBranch>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            branch: None,
        }
    }

    pub fn with_source_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// The kinds of block a node may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Image,
    Video,
    Audio,
    Text,
    Integration,
    Action,
    Condition,
    Collection,
    Form,
}

impl BlockKind {
    /// Image, video and audio blocks count as media assets.
    pub fn is_media(self) -> bool {
        matches!(self, BlockKind::Image | BlockKind::Video | BlockKind::Audio)
    }
}

/// A unit of configuration inside a node. `data` is free-form JSON keyed in camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
    #[serde(default)]
    pub data: Value,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind, data: Value) -> Self {
        Self {
            id: id.into(),
            kind,
            data,
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key).filter(|v| !v.is_null())
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }
}

/// The editable graph of one flow: nodes, edges and the ordered blocks of each node.
///
/// This is the unit the history engine snapshots, so cloning it must produce a
/// value that shares nothing mutable with the original.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub blocks_by_node: BTreeMap<String, Vec<Block>>,
}

impl FlowGraph {
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn edge(&self, edge_id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == edge_id)
    }

    /// Every block paired with the id of the node that owns it.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &Block)> {
        self.blocks_by_node
            .iter()
            .flat_map(|(node_id, blocks)| blocks.iter().map(move |b| (node_id.as_str(), b)))
    }

    /// Finds a block anywhere in the graph with a linear scan.
    pub fn find_block(&self, block_id: &str) -> Option<(&str, &Block)> {
        self.blocks().find(|(_, b)| b.id == block_id)
    }

    pub fn find_block_mut(&mut self, block_id: &str) -> Option<&mut Block> {
        self.blocks_by_node
            .values_mut()
            .flat_map(|blocks| blocks.iter_mut())
            .find(|b| b.id == block_id)
    }

    /// Detaches a block from whichever node holds it.
    pub fn remove_block(&mut self, block_id: &str) -> Option<Block> {
        self.blocks_by_node.values_mut().find_map(|blocks| {
            let index = blocks.iter().position(|b| b.id == block_id)?;
            Some(blocks.remove(index))
        })
    }

    pub fn configuration_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_configuration())
    }

    /// Blocks of the designated configuration node; empty when there is none.
    pub fn configuration_blocks(&self) -> &[Block] {
        self.configuration_node()
            .and_then(|node| self.blocks_by_node.get(&node.id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.node(id).is_some() || self.edge(id).is_some() || self.find_block(id).is_some()
    }
}

impl Validate for FlowGraph {
    fn validate(&self) -> Validation {
        let mut check = Checker::new();

        for node in &self.nodes {
            check.non_empty("node id", &node.id);
        }
        check.unique("nodes", self.nodes.iter().map(|n| n.id.as_str()));

        let configuration_nodes = self.nodes.iter().filter(|n| n.is_configuration()).count();
        if configuration_nodes > 1 {
            check.push(format!(
                "graph has {} configuration nodes, at most one is allowed",
                configuration_nodes
            ));
        }

        for edge in &self.edges {
            check.non_empty("edge id", &edge.id);
            for endpoint in [&edge.source, &edge.target] {
                if self.node(endpoint).is_none() {
                    check.push(format!(
                        "edge '{}' references missing node '{}'",
                        edge.id, endpoint
                    ));
                }
            }
        }
        check.unique("edges", self.edges.iter().map(|e| e.id.as_str()));

        for node_id in self.blocks_by_node.keys() {
            if self.node(node_id).is_none() {
                check.push(format!("blocks are attached to missing node '{}'", node_id));
            }
        }
        for (_, block) in self.blocks() {
            check.non_empty("block id", &block.id);
        }
        check.unique("blocks", self.blocks().map(|(_, b)| b.id.as_str()));

        check.finish()
    }
}
