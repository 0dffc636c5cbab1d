//! Record types of the template hierarchy (templates, groups, sections,
//! blueprints) and of the collaborator hierarchy instantiated from it
//! (scripts, setups, flows).
//!
//! Each entity offers `create(draft)` to fill defaults, a [`Validate`]
//! implementation for pure structural checks, and mutators that return a new
//! value instead of changing the one they are called on.

pub mod blueprint;
pub mod flow;
pub mod graph;
pub mod group;
pub mod ids;
pub mod script;
pub mod section;
pub mod setup;
pub mod template;
pub mod validation;

pub use blueprint::*;
pub use flow::*;
pub use graph::*;
pub use group::*;
pub use ids::{Timestamp, new_id, now};
pub use script::*;
pub use section::*;
pub use setup::*;
pub use template::*;
pub use validation::{Validate, Validation};
