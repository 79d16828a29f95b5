//! Ways of naming a transition target.

use crate::core::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A state addressed by position, by name, or by node handle.
///
/// Index and name targets are resolved against the machine's direct
/// children at the moment of the call, so they always name a child of the
/// machine (or nothing). Node targets may name any node and are checked for
/// ownership before a transition starts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateRef {
    Index(usize),
    Name(String),
    Node(NodeId),
}

impl From<usize> for StateRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for StateRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for StateRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<NodeId> for StateRef {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<&StateRef> for StateRef {
    fn from(target: &StateRef) -> Self {
        target.clone()
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "index {index}"),
            Self::Name(name) => write!(f, "\"{name}\""),
            Self::Node(node) => write!(f, "node {node}"),
        }
    }
}
