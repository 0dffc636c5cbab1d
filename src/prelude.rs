//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the katagami crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use katagami::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let (catalog, _workspace) = WorkspaceDocument::from_file("path/to/workspace.json")?.into_stores()?;
//! let instantiation = Instantiator::new(&catalog).instantiate_by_id("blueprint-1", "script-1")?;
//!
//! let mut session = EditorSession::new(instantiation.flows[0].graph.clone());
//! session.add_node(Node::new("n-2", "messageNode", Point { x: 0.0, y: 120.0 }))?;
//! session.undo();
//! # Ok(())
//! # }
//! ```

// Entity model
pub use crate::model::{
    Block, BlockKind, Blueprint, BlueprintDraft, Edge, Flow, FlowDraft, FlowGraph, Group, GroupDraft, Node,
    Point, Script, ScriptDraft, Section, SectionDraft, Setup, SetupDraft, Template, TemplateDraft,
    Validate, Validation,
};

// Stores and instantiation
pub use crate::catalog::{Catalog, Workspace};
pub use crate::instantiate::{Instantiation, Instantiator, resync_flow};

// Editing
pub use crate::history::{EdgeChange, GraphChange, History};
pub use crate::session::{EditorSession, SessionBuilder};

// Constraints
pub use crate::constraint::{
    ChangeKind, ChangeOutcome, ConfirmationGate, ConstraintEngine, Decision, ImpactAnalysis,
    confirm_change, remove_shared_block,
};

// Persistence and configuration
pub use crate::config::EngineConfig;
pub use crate::document::{ExportOptions, FlowDocument, WorkspaceDocument, export_flow, import_flow};

// Error types
pub use crate::error::{DocumentError, InstantiateError, SessionError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
