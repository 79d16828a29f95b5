//! Composition root for state machines.
//!
//! A [`Scene`] owns the node tree, the registry of machines keyed by their
//! container, and the bootstrap companions that run each machine's
//! two-phase startup. Machines are registered explicitly; nothing is
//! discovered by scanning or by type-name matching.
//!
//! # Lifecycle
//!
//! 1. While **composing**, build the tree and register machines and
//!    [`Bootstrappable`] components. Machines can be arranged freely; no
//!    transition is observable yet.
//! 2. [`Scene::run`] attaches a companion to every registered container,
//!    initializes all of them (every state switched off, silently), and only
//!    then starts each machine in its default state.
//! 3. While **running**, disabling a container returns its machine to the
//!    default state when configured to.
//!
//! # Example
//!
//! ```rust
//! use scenestate::config::MachineConfig;
//! use scenestate::scene::Scene;
//!
//! let mut scene = Scene::new();
//! let door = scene.spawn("Door");
//! let closed = scene.spawn_child(door, "Closed").unwrap();
//! let open = scene.spawn_child(door, "Open").unwrap();
//! scene
//!     .add_machine(door, MachineConfig::default().with_default_state("Closed"))
//!     .unwrap();
//!
//! scene.run();
//! assert_eq!(scene.machine(door).unwrap().current_state(), Some(closed));
//!
//! scene.next(door).unwrap();
//! scene.set_active(door, false).unwrap();
//! assert_eq!(scene.machine(door).unwrap().current_state(), Some(closed));
//! # let _ = open;
//! ```

mod bootstrap;
mod error;
mod node;
pub mod validation;

pub use bootstrap::{BootstrapReport, Bootstrappable};
pub use error::SceneError;
pub use node::StateNode;
pub use validation::SetupIssue;

use crate::config::MachineConfig;
use crate::core::{GraphError, Hierarchy, NodeId, SceneGraph};
use crate::machine::{Lifecycle, StateMachine, StateRef, TransitionError};
use bootstrap::Companion;
use std::collections::{BTreeMap, BTreeSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::{debug, warn};

/// Node tree plus the machines and components registered on it.
pub struct Scene {
    graph: SceneGraph,
    machines: BTreeMap<NodeId, StateMachine>,
    components: BTreeMap<NodeId, Vec<Box<dyn Bootstrappable>>>,
    companions: BTreeMap<NodeId, Companion>,
    lifecycle: Lifecycle,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::with_graph(SceneGraph::new())
    }

    /// Compose on top of an existing tree. The scene turns on the
    /// graph's deactivation journal.
    pub fn with_graph(mut graph: SceneGraph) -> Self {
        graph.track_deactivations(true);
        Self {
            graph,
            machines: BTreeMap::new(),
            components: BTreeMap::new(),
            companions: BTreeMap::new(),
            lifecycle: Lifecycle::Composing,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Direct access to the tree.
    ///
    /// Deactivations made through this handle are delivered to companions
    /// on the next scene operation that routes through the scene.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn spawn(&mut self, name: impl Into<String>) -> NodeId {
        self.graph.spawn(name)
    }

    pub fn spawn_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, SceneError> {
        Ok(self.graph.spawn_child(parent, name)?)
    }

    /// Register a machine over the children of `container`.
    pub fn add_machine(
        &mut self,
        container: NodeId,
        config: MachineConfig,
    ) -> Result<&mut StateMachine, SceneError> {
        if !self.graph.contains(container) {
            return Err(GraphError::UnknownNode(container).into());
        }
        if self.machines.contains_key(&container) {
            return Err(SceneError::MachineAlreadyAttached(container));
        }
        Ok(self
            .machines
            .entry(container)
            .or_insert_with(|| StateMachine::new(container, config)))
    }

    /// Attach a component that needs one-time setup during bootstrap.
    pub fn attach<B>(&mut self, node: NodeId, component: B) -> Result<(), SceneError>
    where
        B: Bootstrappable + 'static,
    {
        if !self.graph.contains(node) {
            return Err(GraphError::UnknownNode(node).into());
        }
        self.components
            .entry(node)
            .or_default()
            .push(Box::new(component));
        Ok(())
    }

    pub fn machine(&self, container: NodeId) -> Option<&StateMachine> {
        self.machines.get(&container)
    }

    pub fn machine_mut(&mut self, container: NodeId) -> Option<&mut StateMachine> {
        self.machines.get_mut(&container)
    }

    /// Registered machines in container order.
    pub fn machines(&self) -> impl Iterator<Item = (NodeId, &StateMachine)> {
        self.machines.iter().map(|(id, machine)| (*id, machine))
    }

    /// Whether `node` already received its bootstrap companion.
    pub fn is_bootstrapped(&self, node: NodeId) -> bool {
        self.companions.contains_key(&node)
    }

    /// Attach a companion to every registered container that lacks one.
    ///
    /// All newly attached containers are initialized before any of them is
    /// started, and containers are visited in ascending id order. While the
    /// scene is composing nothing is started; once it is running, new
    /// machines start right after the initialization sweep.
    pub fn bootstrap(&mut self) -> BootstrapReport {
        let mut report = BootstrapReport::default();

        let pending: BTreeSet<NodeId> = self
            .machines
            .keys()
            .chain(self.components.keys())
            .copied()
            .filter(|node| !self.companions.contains_key(node))
            .collect();

        for node in pending {
            let companion = Companion::awake(
                node,
                &mut self.graph,
                self.machines.get_mut(&node),
                self.components.get_mut(&node),
            );
            self.companions.insert(node, companion);
            report.attached.push(node);
        }

        let fresh = report
            .attached
            .iter()
            .filter_map(|node| self.machines.get(node));
        report.issues = validation::issues(validation::validate_all(&self.graph, fresh));
        for issue in &report.issues {
            warn!(%issue, "state machine setup issue");
        }

        if self.lifecycle == Lifecycle::Running {
            self.start_pending(&mut report);
        }
        self.deliver_disables();
        debug!(
            attached = report.attached.len(),
            started = report.started.len(),
            "bootstrap pass complete"
        );
        report
    }

    /// Bootstrap, switch to running, and start every machine not yet
    /// started.
    pub fn run(&mut self) -> BootstrapReport {
        let mut report = self.bootstrap();
        self.lifecycle = Lifecycle::Running;
        self.start_pending(&mut report);
        self.deliver_disables();
        report
    }

    /// Switch a node on or off. Companions whose container leaves the
    /// active hierarchy are told they were disabled.
    pub fn set_active(&mut self, node: NodeId, active: bool) -> Result<(), SceneError> {
        if !self.graph.contains(node) {
            return Err(GraphError::UnknownNode(node).into());
        }
        self.graph.set_active(node, active);
        self.deliver_disables();
        Ok(())
    }

    pub fn change_state(
        &mut self,
        container: NodeId,
        target: impl Into<StateRef>,
    ) -> Result<NodeId, SceneError> {
        let target = target.into();
        self.routed(container, |machine, graph| machine.change_state(graph, target))
    }

    pub fn next(&mut self, container: NodeId) -> Result<NodeId, SceneError> {
        self.routed(container, |machine, graph| machine.next(graph))
    }

    pub fn previous(&mut self, container: NodeId) -> Result<NodeId, SceneError> {
        self.routed(container, |machine, graph| machine.previous(graph))
    }

    pub fn exit(&mut self, container: NodeId) -> Result<(), SceneError> {
        self.routed(container, |machine, graph| {
            machine.exit(graph);
            Ok(())
        })
    }

    /// Show one state and hide its siblings, without firing events.
    /// Only available while composing.
    pub fn solo(&mut self, state: NodeId) -> Result<(), SceneError> {
        self.ensure_composing()?;
        let parent = self
            .graph
            .parent(state)
            .ok_or(GraphError::NoParent(state))?;
        let siblings = self.graph.children(parent).to_vec();
        for sibling in siblings {
            self.graph.set_active(sibling, sibling == state);
        }
        self.deliver_disables();
        Ok(())
    }

    /// Hide every state of a container, without firing events.
    /// Only available while composing.
    pub fn hide_all(&mut self, container: NodeId) -> Result<(), SceneError> {
        self.ensure_composing()?;
        if !self.graph.contains(container) {
            return Err(GraphError::UnknownNode(container).into());
        }
        let states = self.graph.children(container).to_vec();
        for state in states {
            self.graph.set_active(state, false);
        }
        self.deliver_disables();
        Ok(())
    }

    /// Remove a subtree together with everything registered inside it.
    ///
    /// Machines elsewhere whose current state was removed are left with no
    /// current state; no events fire for removed nodes.
    pub fn despawn(&mut self, node: NodeId) -> Result<(), SceneError> {
        let removed = self.graph.despawn(node)?;
        for id in &removed {
            self.machines.remove(id);
            self.components.remove(id);
            self.companions.remove(id);
        }
        for machine in self.machines.values_mut() {
            if let Some(current) = machine.current_state() {
                if removed.contains(&current) {
                    machine.forget_current();
                }
            }
        }
        Ok(())
    }

    /// Check every registered machine, accumulating all issues.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<SetupIssue>> {
        validation::validate_all(&self.graph, self.machines.values())
    }

    /// Run `op` against the machine on `container`, then deliver any
    /// disables the operation caused.
    ///
    /// Refused while composing: `initialize` would later switch the entered
    /// state off behind the machine's back.
    pub(crate) fn route<T, F>(&mut self, container: NodeId, op: F) -> Result<T, SceneError>
    where
        F: FnOnce(&mut StateMachine, &mut SceneGraph) -> T,
    {
        let machine = self
            .machines
            .get_mut(&container)
            .ok_or(SceneError::NoMachine(container))?;
        if self.lifecycle != Lifecycle::Running {
            return Err(SceneError::NotRunning(container));
        }
        let result = op(machine, &mut self.graph);
        self.deliver_disables();
        Ok(result)
    }

    fn routed<T, F>(&mut self, container: NodeId, op: F) -> Result<T, SceneError>
    where
        F: FnOnce(&mut StateMachine, &mut SceneGraph) -> Result<T, TransitionError>,
    {
        self.route(container, op)?.map_err(SceneError::from)
    }

    fn start_pending(&mut self, report: &mut BootstrapReport) {
        for (node, companion) in self.companions.iter_mut() {
            if companion.is_started() {
                continue;
            }
            companion.start(
                *node,
                &mut self.graph,
                self.machines.get_mut(node),
                report,
            );
        }
    }

    // Runs to a fixed point: returning a machine to its default can switch
    // off states that are themselves machine containers.
    fn deliver_disables(&mut self) {
        loop {
            let disabled = self.graph.take_deactivated();
            if disabled.is_empty() {
                break;
            }
            if self.lifecycle != Lifecycle::Running {
                continue;
            }
            for node in disabled {
                let (Some(companion), Some(machine)) =
                    (self.companions.get(&node), self.machines.get_mut(&node))
                else {
                    continue;
                };
                companion.disable(&mut self.graph, machine);
            }
        }
    }

    fn ensure_composing(&self) -> Result<(), SceneError> {
        match self.lifecycle {
            Lifecycle::Composing => Ok(()),
            Lifecycle::Running => Err(SceneError::Running),
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("lifecycle", &self.lifecycle)
            .field("machines", &self.machines.len())
            .field("companions", &self.companions.len())
            .finish()
    }
}
