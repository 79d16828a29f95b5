//! Build errors for the machine builder.

use crate::scene::SceneError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("No states defined for \"{machine}\". Add at least one with .state(name)")]
    NoStates { machine: String },

    #[error("State \"{name}\" is defined more than once for \"{machine}\"")]
    DuplicateStateName { machine: String, name: String },

    #[error("Default state {target} is not one of the states of \"{machine}\"")]
    UnknownDefaultState { machine: String, target: String },

    #[error(transparent)]
    Scene(#[from] SceneError),
}
