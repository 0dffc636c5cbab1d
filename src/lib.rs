//! # Katagami - Workflow Template Instantiation and Editing Engine
//!
//! **Katagami** manages a two-level hierarchy of node-based workflow templates.
//! Administrators compose templates into groups, groups into sections and
//! sections into blueprints. Collaborators instantiate a blueprint into an
//! independent setup holding one flow per template use, then edit each flow's
//! graph with undo/redo and configuration constraints enforced.
//!
//! ## Core Workflow
//!
//! 1.  **Load the Hierarchy**: Read a `WorkspaceDocument` and split it into a `Catalog` (administrator side) and a `Workspace` (collaborator side).
//! 2.  **Instantiate**: Use an `Instantiator` to turn a blueprint into a `Setup` and its `Flow`s. Nothing is generated unless the whole blueprint resolves.
//! 3.  **Edit**: Open an `EditorSession` on a flow. Every command is recorded in a bounded snapshot history, and configuration blocks are checked by the `ConstraintEngine`.
//! 4.  **Write Back**: Hand the edits back to the flow with `EditorSession::write_back` and store it in the workspace.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use katagami::prelude::*;
//! use katagami::constraint::ChangeKind;
//!
//! fn main() -> Result<()> {
//!     let (catalog, mut workspace) =
//!         WorkspaceDocument::from_file("data/workspace.json")?.into_stores()?;
//!
//!     // Instantiate a blueprint for a script.
//!     let instantiation = Instantiator::new(&catalog).instantiate_by_id("onboarding", "script-1")?;
//!     let flow = instantiation.flows[0].clone();
//!     workspace.insert_instantiation(instantiation);
//!
//!     // Edit the first flow.
//!     let mut session = SessionBuilder::for_flow(&flow)
//!         .with_config(EngineConfig::from_file("data/engine.json")?)
//!         .build();
//!     session.add_node(Node::new("reminder", "messageNode", Point { x: 240.0, y: 0.0 }))?;
//!
//!     // Removing a shared block asks before resetting anything that points at it.
//!     let outcome = remove_shared_block(&mut session, "hero-image", &mut |analysis: &ImpactAnalysis| {
//!         println!("{}", analysis.summary);
//!         true
//!     })?;
//!     println!("{:?}", outcome);
//!     assert_eq!(session.constraints().analyze_change_impact(session.graph(), "hero-image", ChangeKind::Remove).field_count(), 0);
//!
//!     workspace.put_flow(session.write_back(&flow))?;
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod catalog;
pub mod config;
pub mod constraint;
pub mod document;
pub mod error;
pub mod history;
pub mod instantiate;
pub mod ledger;
pub mod model;
pub mod prelude;
pub mod session;
