//! Bootstrap companions.
//!
//! Every container that needs one-time setup gets exactly one companion.
//! The companion drives three moments of the container's life:
//!
//! 1. **Awake** (when attached): run each [`Bootstrappable`] component's
//!    setup, then switch every state of the machine off silently.
//! 2. **Start** (once the scene is running): enter the default state.
//! 3. **Disable** (the container left the active hierarchy): return to the
//!    default state if the machine asks for it.

use crate::core::{NodeId, SceneGraph};
use crate::machine::{Lifecycle, StateMachine, TransitionError};
use tracing::{debug, warn};

use super::validation::SetupIssue;

/// Capability for components that need a one-time setup call before the
/// scene starts running.
///
/// Components opt in by implementing this trait and being attached to a
/// node with [`Scene::attach`](super::Scene::attach); the bootstrap pass
/// calls [`initialize`](Bootstrappable::initialize) exactly once.
pub trait Bootstrappable: Send {
    fn initialize(&mut self, node: NodeId);
}

/// Outcome of a bootstrap pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BootstrapReport {
    /// Containers that received a companion during this pass
    pub attached: Vec<NodeId>,
    /// Machines that entered their default state during this pass
    pub started: Vec<NodeId>,
    /// Machines whose default state could not be entered
    pub failed: Vec<(NodeId, TransitionError)>,
    /// Setup problems found on newly attached machines
    pub issues: Vec<SetupIssue>,
}

impl BootstrapReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.issues.is_empty()
    }
}

/// Per-container bootstrap state.
#[derive(Debug, Default)]
pub(crate) struct Companion {
    started: bool,
}

impl Companion {
    pub(crate) fn awake(
        node: NodeId,
        graph: &mut SceneGraph,
        machine: Option<&mut StateMachine>,
        components: Option<&mut Vec<Box<dyn Bootstrappable>>>,
    ) -> Self {
        for component in components.into_iter().flatten() {
            component.initialize(node);
        }
        if let Some(machine) = machine {
            machine.initialize(graph);
        }
        debug!(%node, "companion attached");
        Self::default()
    }

    pub(crate) fn is_started(&self) -> bool {
        self.started
    }

    /// Enter the machine's default state. Runs at most once.
    pub(crate) fn start(
        &mut self,
        node: NodeId,
        graph: &mut SceneGraph,
        machine: Option<&mut StateMachine>,
        report: &mut BootstrapReport,
    ) {
        if self.started {
            return;
        }
        self.started = true;

        let Some(machine) = machine else {
            return;
        };
        match machine.start(graph, Lifecycle::Running) {
            Ok(Some(_)) => report.started.push(node),
            Ok(None) => {}
            Err(error) => {
                warn!(%node, %error, "state machine failed to enter its default state");
                report.failed.push((node, error));
            }
        }
    }

    pub(crate) fn disable(&self, graph: &mut SceneGraph, machine: &mut StateMachine) {
        if let Err(error) = machine.return_to_default(graph) {
            debug!(%error, "return to default state on disable refused");
        }
    }
}
