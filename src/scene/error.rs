//! Scene error types.

use crate::core::{GraphError, NodeId};
use crate::machine::TransitionError;
use thiserror::Error;

/// Errors raised by the composition root.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SceneError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Node {0} already has a state machine")]
    MachineAlreadyAttached(NodeId),

    #[error("Node {0} has no state machine")]
    NoMachine(NodeId),

    #[error("Edit-time operations are unavailable while the scene is running")]
    Running,

    #[error("State machine on {0} cannot change state before the scene is running")]
    NotRunning(NodeId),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}
