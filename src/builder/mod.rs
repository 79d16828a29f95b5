//! Builder API for composing a machine and its states in one go.
//!
//! Building spawns a container node, one child per state in the given
//! order, and registers a machine over them. The description is checked
//! before anything is spawned, so a failed build leaves the scene as it
//! was.

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::MachineBuilder;
