//! State machine over the ordered children of a container node.

use super::error::TransitionError;
use super::events::{Listeners, MachineEvent, SubscriptionId};
use super::target::StateRef;
use crate::config::MachineConfig;
use crate::core::{Hierarchy, NodeId, StateHistory, TransitionRecord};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Phase of the host's composition lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Containers are being created and arranged; nothing is observable yet
    Composing,
    /// Normal per-frame operation has begun
    Running,
}

/// Snapshot of one state of a machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    pub id: NodeId,
    pub name: String,
    pub index: usize,
    pub active: bool,
    pub current: bool,
}

/// Finite state machine whose states are the direct children of a
/// container node.
///
/// At most one child is current. Entering a state switches its node on,
/// exiting switches it off. The machine never owns the tree: every
/// operation borrows the host's [`Hierarchy`] for its duration.
///
/// # Example
///
/// ```rust
/// use scenestate::config::MachineConfig;
/// use scenestate::core::{Hierarchy, SceneGraph};
/// use scenestate::machine::StateMachine;
///
/// let mut graph = SceneGraph::new();
/// let door = graph.spawn("Door");
/// let closed = graph.spawn_child(door, "Closed").unwrap();
/// let open = graph.spawn_child(door, "Open").unwrap();
///
/// let mut machine = StateMachine::new(door, MachineConfig::default().verbose(false));
/// machine.initialize(&mut graph);
///
/// assert_eq!(machine.next(&mut graph), Ok(closed));
/// assert_eq!(machine.next(&mut graph), Ok(open));
/// assert!(machine.at_last());
/// assert!(graph.is_active(open));
/// assert!(!graph.is_active(closed));
/// ```
#[derive(Debug)]
pub struct StateMachine {
    container: NodeId,
    config: MachineConfig,
    current: Option<NodeId>,
    at_first: bool,
    at_last: bool,
    listeners: Listeners,
    history: StateHistory,
}

impl StateMachine {
    /// Create a machine with no active state.
    pub fn new(container: NodeId, config: MachineConfig) -> Self {
        let history = StateHistory::with_capacity(config.history_capacity);
        Self {
            container,
            config,
            current: None,
            at_first: false,
            at_last: false,
            listeners: Listeners::default(),
            history,
        }
    }

    /// Node whose children are this machine's states.
    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Mutable access to the configuration. History capacity is fixed at
    /// construction and is not affected.
    pub fn config_mut(&mut self) -> &mut MachineConfig {
        &mut self.config
    }

    pub fn current_state(&self) -> Option<NodeId> {
        self.current
    }

    /// Whether the current state was first among its siblings when entered.
    pub fn at_first(&self) -> bool {
        self.at_first
    }

    /// Whether the current state was last among its siblings when entered.
    pub fn at_last(&self) -> bool {
        self.at_last
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Register a listener for every event this machine fires.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&MachineEvent) + Send + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Per-state snapshot in sibling order.
    pub fn states<H: Hierarchy>(&self, graph: &H) -> Vec<StateInfo> {
        (0..graph.child_count(self.container))
            .filter_map(|index| {
                let id = graph.child(self.container, index)?;
                Some(StateInfo {
                    id,
                    name: graph.name(id).unwrap_or_default().to_string(),
                    index,
                    active: graph.is_active(id),
                    current: self.current == Some(id),
                })
            })
            .collect()
    }

    /// Turn a target into a node handle without transitioning.
    ///
    /// Index and name targets must match a direct child; node targets are
    /// returned as given.
    pub fn resolve<H: Hierarchy>(
        &self,
        graph: &H,
        target: &StateRef,
    ) -> Result<NodeId, TransitionError> {
        match target {
            StateRef::Node(node) => Ok(*node),
            StateRef::Index(index) => graph.child(self.container, *index).ok_or_else(|| {
                TransitionError::IndexOutOfRange {
                    machine: label(&*graph, self.container),
                    index: *index,
                    count: graph.child_count(self.container),
                }
            }),
            StateRef::Name(name) => graph.find_child(self.container, name).ok_or_else(|| {
                TransitionError::NameNotFound {
                    machine: label(&*graph, self.container),
                    name: name.clone(),
                }
            }),
        }
    }

    /// Exit the current state (if any) and enter `target`.
    ///
    /// Refused when the target is already current and reentry is off, or
    /// when the target is not a direct child of this machine. A refused
    /// request changes nothing and fires nothing.
    pub fn change_state<H: Hierarchy>(
        &mut self,
        graph: &mut H,
        target: impl Into<StateRef>,
    ) -> Result<NodeId, TransitionError> {
        let target = target.into();
        let node = self
            .resolve(&*graph, &target)
            .map_err(|error| self.reject(error))?;
        self.transition(graph, node)
    }

    /// Advance to the next sibling. With no current state this enters the
    /// first state; at the last state it does nothing.
    pub fn next<H: Hierarchy>(&mut self, graph: &mut H) -> Result<NodeId, TransitionError> {
        let Some(current) = self.current else {
            return self.change_state(graph, 0usize);
        };
        let last = graph.child_count(self.container).saturating_sub(1);
        match self.position_of(&*graph, current) {
            Some(index) if index >= last => Ok(current),
            Some(index) => self.change_state(graph, index + 1),
            None => self.change_state(graph, 0usize),
        }
    }

    /// Step back to the previous sibling. With no current state this enters
    /// the first state; at the first state it does nothing.
    pub fn previous<H: Hierarchy>(&mut self, graph: &mut H) -> Result<NodeId, TransitionError> {
        let Some(current) = self.current else {
            return self.change_state(graph, 0usize);
        };
        match self.position_of(&*graph, current) {
            Some(0) => Ok(current),
            Some(index) => self.change_state(graph, index - 1),
            None => self.change_state(graph, 0usize),
        }
    }

    /// Leave the current state, leaving the machine with no active state.
    pub fn exit<H: Hierarchy>(&mut self, graph: &mut H) {
        if let Some(from) = self.exit_current(graph) {
            self.record(Some(from), None);
        }
    }

    /// Switch every state off without firing events or touching the
    /// current state.
    pub fn initialize<H: Hierarchy>(&mut self, graph: &mut H) {
        let states: Vec<NodeId> = (0..graph.child_count(self.container))
            .filter_map(|index| graph.child(self.container, index))
            .collect();
        for state in states {
            graph.set_active(state, false);
        }
    }

    /// Enter the default state, if one is configured and the host is
    /// running. Returns `Ok(None)` when there was nothing to do.
    pub fn start<H: Hierarchy>(
        &mut self,
        graph: &mut H,
        lifecycle: Lifecycle,
    ) -> Result<Option<NodeId>, TransitionError> {
        if lifecycle != Lifecycle::Running {
            return Ok(None);
        }
        match self.config.default_state.clone() {
            Some(default) => self.change_state(graph, default).map(Some),
            None => Ok(None),
        }
    }

    /// Force the machine back into its default state, as done when its
    /// container is disabled.
    ///
    /// No-op when the policy is off, no default is configured, or the
    /// default is already current. Otherwise the machine ends in the
    /// default state whether or not a state was active before.
    pub fn return_to_default<H: Hierarchy>(
        &mut self,
        graph: &mut H,
    ) -> Result<Option<NodeId>, TransitionError> {
        if !self.config.return_to_default_on_disable {
            return Ok(None);
        }
        let Some(default) = self.config.default_state.clone() else {
            return Ok(None);
        };
        let target = self
            .resolve(&*graph, &default)
            .map_err(|error| self.reject(error))?;
        if self.current == Some(target) {
            return Ok(None);
        }
        self.transition(graph, target).map(Some)
    }

    /// Drop the current state without firing events, for when its node
    /// was removed from the tree.
    pub(crate) fn forget_current(&mut self) {
        self.current = None;
        self.at_first = false;
        self.at_last = false;
    }

    fn transition<H: Hierarchy>(
        &mut self,
        graph: &mut H,
        target: NodeId,
    ) -> Result<NodeId, TransitionError> {
        if self.current == Some(target) && !self.config.allow_reentry {
            return Err(self.reject(TransitionError::ReentryRejected {
                machine: label(&*graph, self.container),
                state: label(&*graph, target),
            }));
        }

        if graph.parent(target) != Some(self.container) {
            return Err(self.reject(TransitionError::NotAChild {
                machine: label(&*graph, self.container),
                state: label(&*graph, target),
            }));
        }

        let from = self.exit_current(graph);
        self.enter(graph, target);
        self.record(from, Some(target));
        Ok(target)
    }

    fn exit_current<H: Hierarchy>(&mut self, graph: &mut H) -> Option<NodeId> {
        let state = self.current?;
        if self.config.verbose {
            info!(
                machine = %label(&*graph, self.container),
                state = %label(&*graph, state),
                "(-) exited"
            );
        }

        self.set_at_first(false, state);
        self.set_at_last(false, state);
        self.listeners.emit(MachineEvent::StateExited(state));
        graph.set_active(state, false);
        self.current = None;
        Some(state)
    }

    fn enter<H: Hierarchy>(&mut self, graph: &mut H, state: NodeId) {
        self.current = Some(state);
        let last = graph.child_count(self.container).saturating_sub(1);
        let index = graph.sibling_index(state);

        if index == Some(0) {
            self.set_at_first(true, state);
        }
        if index == Some(last) {
            self.set_at_last(true, state);
        }

        if self.config.verbose {
            info!(
                machine = %label(&*graph, self.container),
                state = %label(&*graph, state),
                "(+) entered"
            );
        }
        self.listeners.emit(MachineEvent::StateEntered(state));
        graph.set_active(state, true);
    }

    // Edge-triggered: events fire only when the flag flips.
    fn set_at_first(&mut self, value: bool, state: NodeId) {
        if self.at_first == value {
            return;
        }
        self.at_first = value;
        self.listeners.emit(if value {
            MachineEvent::FirstStateEntered(state)
        } else {
            MachineEvent::FirstStateExited(state)
        });
    }

    fn set_at_last(&mut self, value: bool, state: NodeId) {
        if self.at_last == value {
            return;
        }
        self.at_last = value;
        self.listeners.emit(if value {
            MachineEvent::LastStateEntered(state)
        } else {
            MachineEvent::LastStateExited(state)
        });
    }

    fn position_of<H: Hierarchy>(&self, graph: &H, state: NodeId) -> Option<usize> {
        if graph.parent(state) != Some(self.container) {
            return None;
        }
        graph.sibling_index(state)
    }

    fn record(&mut self, from: Option<NodeId>, to: Option<NodeId>) {
        self.history.record(TransitionRecord {
            from,
            to,
            timestamp: Utc::now(),
        });
    }

    fn reject(&self, error: TransitionError) -> TransitionError {
        if self.config.verbose {
            if error.is_reentry() {
                debug!(%error, "transition ignored");
            } else {
                warn!(%error, "transition rejected");
            }
        }
        error
    }
}

pub(crate) fn label<H: Hierarchy>(graph: &H, node: NodeId) -> String {
    graph
        .name(node)
        .map(str::to_string)
        .unwrap_or_else(|| node.to_string())
}
