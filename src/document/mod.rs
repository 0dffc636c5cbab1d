//! JSON documents exchanged with the persistence collaborator.
//!
//! [`FlowDocument`] is the single-graph format the editor imports and exports;
//! [`WorkspaceDocument`] carries the whole template and collaborator hierarchy.
//! Both are validated before anything they describe reaches live state.

mod workspace;

pub use workspace::WorkspaceDocument;

use crate::error::DocumentError;
use crate::model::{FlowGraph, Timestamp, Validate, Validation, now};
use crate::session::EditorSession;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use tracing::{info, warn};

/// The exported form of one editable graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub graph: FlowGraph,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<Timestamp>,
}

impl FlowDocument {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &str) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }
}

impl Validate for FlowDocument {
    fn validate(&self) -> Validation {
        self.graph.validate()
    }
}

/// A trait for editor formats that can be converted into a [`FlowDocument`].
///
/// Implement it on your own structs to feed graphs from another tool into
/// [`import_flow`] without going through JSON by hand.
///
/// # Example
///
/// ```rust,no_run
/// use katagami::document::{FlowDocument, IntoFlowDocument};
/// use katagami::error::DocumentError;
/// use katagami::model::{FlowGraph, Node, Point};
///
/// struct Sketch { steps: Vec<String> }
///
/// impl IntoFlowDocument for Sketch {
///     fn into_flow_document(self) -> Result<FlowDocument, DocumentError> {
///         let nodes = self
///             .steps
///             .into_iter()
///             .enumerate()
///             .map(|(i, id)| Node::new(id, "messageNode", Point { x: 0.0, y: i as f64 * 120.0 }))
///             .collect();
///         Ok(FlowDocument {
///             name: "sketch".to_string(),
///             graph: FlowGraph { nodes, ..Default::default() },
///             exported_at: None,
///         })
///     }
/// }
/// ```
pub trait IntoFlowDocument {
    fn into_flow_document(self) -> Result<FlowDocument, DocumentError>;
}

impl IntoFlowDocument for FlowDocument {
    fn into_flow_document(self) -> Result<FlowDocument, DocumentError> {
        Ok(self)
    }
}

impl IntoFlowDocument for Value {
    fn into_flow_document(self) -> Result<FlowDocument, DocumentError> {
        Ok(serde_json::from_value(self)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub name: String,
    pub include_timestamp: bool,
}

/// Serialises the session's live graph.
pub fn export_flow(session: &EditorSession, options: &ExportOptions) -> Result<Value, DocumentError> {
    let document = FlowDocument {
        name: options.name.clone(),
        graph: session.graph().clone(),
        exported_at: options.include_timestamp.then(now),
    };
    Ok(serde_json::to_value(document)?)
}

/// Replaces the session's live graph with an imported one.
///
/// The document is parsed and validated first; on any failure the session is
/// left untouched. With `clear_history` the imported graph becomes the only
/// history entry, otherwise the import is recorded as one undoable step.
pub fn import_flow<D>(
    session: &mut EditorSession,
    document: D,
    clear_history: bool,
) -> Result<(), DocumentError>
where
    D: IntoFlowDocument,
{
    let document = document.into_flow_document()?;
    if let Err(errors) = document.validate().into_result() {
        warn!(name = %document.name, ?errors, "rejected flow import");
        return Err(DocumentError::Invalid(errors));
    }

    let constraints = session.constraints().validate(&document.graph);
    if !constraints.valid {
        warn!(errors = ?constraints.errors, "imported flow violates configuration constraints");
    }

    let nodes = document.graph.nodes.len();
    session.replace(document.graph);
    if clear_history {
        session.clear_history();
    } else {
        session.save_state();
    }
    info!(name = %document.name, nodes, clear_history, "imported flow");
    Ok(())
}
