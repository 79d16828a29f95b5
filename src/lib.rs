//! Scenestate: component state machines over an ordered scene tree
//!
//! A state machine here is a container node whose direct children are its
//! states. Exactly one child (or none) is current; entering a state switches
//! its node on and exiting switches it off. Machines never own the tree:
//! every operation borrows the host's [`Hierarchy`], so the same machine
//! logic runs against the bundled [`SceneGraph`] or any other tree.
//!
//! # Core Concepts
//!
//! - **Machine**: [`StateMachine`], the transition protocol with boundary
//!   tracking, reentry control and a notification sink
//! - **Scene**: [`Scene`], the explicit composition root that registers
//!   machines and runs their two-phase bootstrap
//! - **State node**: [`StateNode`], a per-state façade that forwards to
//!   whichever machine owns its parent
//! - **Builder**: [`MachineBuilder`], which spawns a container and its
//!   states in one validated step
//!
//! # Example
//!
//! ```rust
//! use scenestate::{MachineBuilder, MachineEvent, Scene};
//! use std::sync::{Arc, Mutex};
//!
//! let mut scene = Scene::new();
//! let menu = MachineBuilder::new("Menu")
//!     .states(["A", "B", "C"])
//!     .verbose(false)
//!     .build(&mut scene)
//!     .unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! scene
//!     .machine_mut(menu)
//!     .unwrap()
//!     .subscribe(move |event| sink.lock().unwrap().push(*event));
//!
//! scene.run();
//! let a = scene.next(menu).unwrap();
//!
//! assert_eq!(
//!     *seen.lock().unwrap(),
//!     vec![MachineEvent::FirstStateEntered(a), MachineEvent::StateEntered(a)]
//! );
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod machine;
pub mod scene;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use config::{ConfigError, MachineConfig};
pub use core::{GraphError, Hierarchy, NodeId, SceneGraph, StateHistory, TransitionRecord};
pub use machine::{Lifecycle, MachineEvent, StateMachine, StateRef, TransitionError};
pub use scene::{BootstrapReport, Bootstrappable, Scene, SceneError, SetupIssue, StateNode};
