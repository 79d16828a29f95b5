//! The state machine and its transition protocol.
//!
//! # Key Concepts
//!
//! - **States**: the ordered direct children of a container node
//! - **Transitions**: exit the current state, then enter the target
//! - **Boundaries**: entering or leaving the first/last state fires its own
//!   notifications, before the general enter/exit notification
//! - **Refusals**: invalid requests are logged (when verbose) and returned
//!   as [`TransitionError`], leaving the machine untouched

mod error;
mod events;
#[allow(clippy::module_inception)]
mod machine;
mod target;

pub use error::TransitionError;
pub use events::{Listeners, MachineEvent, SubscriptionId};
pub use machine::{Lifecycle, StateInfo, StateMachine};
pub use target::StateRef;

pub(crate) use machine::label;
