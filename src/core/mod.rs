//! Host-facing building blocks.
//!
//! - The ordered container tree state machines run against
//! - Bounded history of completed transitions

mod graph;
mod history;

pub use graph::{GraphError, Hierarchy, NodeId, SceneGraph};
pub use history::{StateHistory, TransitionRecord};
