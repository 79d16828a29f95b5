//! Transition errors.

use thiserror::Error;

/// Reasons a transition request was refused.
///
/// None of these are fatal: a refused request leaves the machine exactly as
/// it was.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// A state node has no machine on its parent container
    #[error("State \"{state}\" must be the child of a state machine to operate")]
    NoOwningMachine { state: String },

    /// Target is not a direct child of the machine
    #[error("State \"{state}\" is not a child of state machine \"{machine}\"; state change canceled")]
    NotAChild { machine: String, state: String },

    /// Index is past the last state
    #[error("Index {index} is out of range for state machine \"{machine}\" with {count} states")]
    IndexOutOfRange {
        machine: String,
        index: usize,
        count: usize,
    },

    /// No direct child carries the requested name
    #[error("State machine \"{machine}\" does not contain a state named \"{name}\"")]
    NameNotFound { machine: String, name: String },

    /// Target is already active and reentry is disabled
    #[error("State change ignored; state machine \"{machine}\" is already in \"{state}\"")]
    ReentryRejected { machine: String, state: String },

    /// The host has not started running yet
    #[error("State machine \"{machine}\" cannot change state before the scene is running")]
    NotRunning { machine: String },
}

impl TransitionError {
    /// Whether this is the informational reentry refusal rather than a
    /// misconfigured request.
    pub fn is_reentry(&self) -> bool {
        matches!(self, Self::ReentryRejected { .. })
    }
}
