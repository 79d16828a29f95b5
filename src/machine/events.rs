//! Notifications fired by a state machine.

use crate::core::NodeId;
use serde::{Deserialize, Serialize};

/// Something observable that happened during a transition.
///
/// Every event carries the state it concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineEvent {
    StateEntered(NodeId),
    StateExited(NodeId),
    FirstStateEntered(NodeId),
    FirstStateExited(NodeId),
    LastStateEntered(NodeId),
    LastStateExited(NodeId),
}

impl MachineEvent {
    /// The state this event is about.
    pub fn state(&self) -> NodeId {
        match *self {
            Self::StateEntered(id)
            | Self::StateExited(id)
            | Self::FirstStateEntered(id)
            | Self::FirstStateExited(id)
            | Self::LastStateEntered(id)
            | Self::LastStateExited(id) => id,
        }
    }

    /// Whether this is one of the boundary (first/last) notifications.
    pub fn is_boundary(&self) -> bool {
        !matches!(self, Self::StateEntered(_) | Self::StateExited(_))
    }
}

/// Handle returned by [`Listeners::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&MachineEvent) + Send>;

/// Ordered set of event listeners.
///
/// Listeners run synchronously, in subscription order, while the owning
/// machine is mutably borrowed, so a listener can never start another
/// transition on the same machine mid-flight.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&MachineEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: MachineEvent) {
        for (_, listener) in &mut self.entries {
            listener(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SceneGraph;
    use std::sync::{Arc, Mutex};

    #[test]
    fn listeners_run_in_subscription_order() {
        let mut graph = SceneGraph::new();
        let idle = graph.spawn("Idle");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::default();

        let first = Arc::clone(&seen);
        listeners.subscribe(move |_| first.lock().unwrap().push("first"));
        let second = Arc::clone(&seen);
        listeners.subscribe(move |_| second.lock().unwrap().push("second"));

        listeners.emit(MachineEvent::StateEntered(idle));

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let mut graph = SceneGraph::new();
        let idle = graph.spawn("Idle");
        let count = Arc::new(Mutex::new(0));
        let mut listeners = Listeners::default();

        let counter = Arc::clone(&count);
        let id = listeners.subscribe(move |_| *counter.lock().unwrap() += 1);
        listeners.emit(MachineEvent::StateEntered(idle));

        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.emit(MachineEvent::StateExited(idle));

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn event_reports_its_state() {
        let mut graph = SceneGraph::new();
        let idle = graph.spawn("Idle");

        assert_eq!(MachineEvent::LastStateExited(idle).state(), idle);
        assert!(MachineEvent::FirstStateEntered(idle).is_boundary());
        assert!(!MachineEvent::StateExited(idle).is_boundary());
    }
}
