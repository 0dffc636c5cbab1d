use crate::model::{Block, Edge, Node, Point, Size};
use serde::{Deserialize, Serialize};

/// A raw node change reported by the display layer.
///
/// Only additions, removals and the end of a drag gesture are history
/// significant; selection, resizing and intermediate drag frames update the
/// live graph without ever producing a history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GraphChange {
    Add {
        node: Node,
        #[serde(default)]
        blocks: Vec<Block>,
    },
    Remove {
        id: String,
    },
    Position {
        id: String,
        #[serde(default)]
        position: Option<Point>,
        #[serde(default)]
        dragging: bool,
    },
    Select {
        id: String,
        selected: bool,
    },
    Resize {
        id: String,
        dimensions: Size,
    },
}

impl GraphChange {
    pub fn is_history_significant(&self) -> bool {
        match self {
            GraphChange::Add { .. } | GraphChange::Remove { .. } => true,
            GraphChange::Position { dragging, .. } => !dragging,
            GraphChange::Select { .. } | GraphChange::Resize { .. } => false,
        }
    }
}

/// A raw edge change reported by the display layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EdgeChange {
    Add { edge: Edge },
    Remove { id: String },
    Select { id: String, selected: bool },
}

impl EdgeChange {
    pub fn is_history_significant(&self) -> bool {
        !matches!(self, EdgeChange::Select { .. })
    }
}
