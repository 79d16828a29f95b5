//! State transition history tracking.
//!
//! Each machine keeps a bounded record of the transitions it completed, so
//! hosts can inspect how a machine got where it is without subscribing to
//! every event.

use super::graph::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single completed transition.
///
/// `from` is `None` when the machine had no active state; `to` is `None`
/// when the transition was a plain exit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state being left
    pub from: Option<NodeId>,
    /// The state being entered
    pub to: Option<NodeId>,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of transitions.
///
/// Once `capacity` records are held, recording a new one drops the oldest.
/// A capacity of zero disables recording.
///
/// # Example
///
/// ```rust
/// use scenestate::core::{SceneGraph, StateHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut graph = SceneGraph::new();
/// let idle = graph.spawn("Idle");
/// let run = graph.spawn("Run");
///
/// let mut history = StateHistory::with_capacity(8);
/// history.record(TransitionRecord { from: None, to: Some(idle), timestamp: Utc::now() });
/// history.record(TransitionRecord { from: Some(idle), to: Some(run), timestamp: Utc::now() });
///
/// assert_eq!(history.get_path(), vec![None, Some(idle), Some(run)]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory {
    capacity: usize,
    transitions: VecDeque<TransitionRecord>,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl StateHistory {
    /// Create an empty history holding at most `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            transitions: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    /// Append a transition, evicting the oldest record when full.
    pub fn record(&mut self, transition: TransitionRecord) {
        if self.capacity == 0 {
            return;
        }
        while self.transitions.len() >= self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` of the oldest retained record followed by the
    /// `to` of every record.
    pub fn get_path(&self) -> Vec<Option<NodeId>> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(first.from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Time between the oldest and newest retained records.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.front()?;
        let last = self.transitions.back()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&TransitionRecord> {
        self.transitions.back()
    }

    /// Retained records, oldest first.
    pub fn transitions(&self) -> impl ExactSizeIterator<Item = &TransitionRecord> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}
