//! Ordered container tree that state machines operate on.
//!
//! A state machine only needs to ask its host a handful of questions about
//! the tree it lives in: how many children a container has, which child sits
//! at a position, where a node sits among its siblings, and whether a node
//! is switched on. The [`Hierarchy`] trait captures exactly that boundary;
//! [`SceneGraph`] is the arena-backed implementation shipped with the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque handle to a node in a [`SceneGraph`].
///
/// Handles are plain indices: copying one never extends the lifetime of the
/// node it names, and a handle to a despawned node simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena slot of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised by structural graph mutations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    #[error("Node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("Node {0} has no parent")]
    NoParent(NodeId),

    #[error("Sibling index {index} out of range (parent has {count} children)")]
    SiblingIndexOutOfRange { index: usize, count: usize },
}

/// Queryable, ordered-children view of the host's object tree.
///
/// Read queries on unknown nodes return `None`, `0` or `false` rather than
/// failing, mirroring how a missing object simply has no children.
pub trait Hierarchy {
    /// Name of the node.
    fn name(&self, node: NodeId) -> Option<&str>;

    /// Parent container of the node, if any.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Number of direct children.
    fn child_count(&self, node: NodeId) -> usize;

    /// Direct child at `index`.
    fn child(&self, node: NodeId, index: usize) -> Option<NodeId>;

    /// Whether the node's own active flag is set.
    fn is_active(&self, node: NodeId) -> bool;

    /// Switch the node's own active flag.
    fn set_active(&mut self, node: NodeId, active: bool);

    /// Position of the node among its siblings.
    fn sibling_index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        (0..self.child_count(parent)).position(|i| self.child(parent, i) == Some(node))
    }

    /// First direct child whose name matches exactly.
    fn find_child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        (0..self.child_count(node))
            .filter_map(|i| self.child(node, i))
            .find(|child| self.name(*child) == Some(name))
    }
}

#[derive(Clone, Debug)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    active: bool,
}

/// Arena-backed scene tree.
///
/// Besides the structure itself the graph can keep a deactivation journal.
/// Once enabled with [`track_deactivations`], every node that drops out of
/// the active hierarchy (its own flag was cleared, or an ancestor's was) is
/// queued until [`take_deactivated`] drains it. The composition root turns
/// the journal on to tell bootstrap companions that their container was
/// disabled; a bare graph records nothing.
///
/// [`track_deactivations`]: SceneGraph::track_deactivations
/// [`take_deactivated`]: SceneGraph::take_deactivated
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Option<Node>>,
    tracking: bool,
    deactivated: Vec<NodeId>,
}

impl SceneGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an active root node.
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(name.into(), None)
    }

    /// Spawn an active node as the last child of `parent`.
    pub fn spawn_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, GraphError> {
        if !self.contains(parent) {
            return Err(GraphError::UnknownNode(parent));
        }
        let id = self.insert(name.into(), Some(parent));
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }
        Ok(id)
    }

    /// Remove a node and its whole subtree. Returns every removed id,
    /// the node itself first.
    ///
    /// Removal does not journal deactivations.
    pub fn despawn(&mut self, node: NodeId) -> Result<Vec<NodeId>, GraphError> {
        let parent = self.node(node).ok_or(GraphError::UnknownNode(node))?.parent;
        if let Some(parent_node) = parent.and_then(|p| self.node_mut(p)) {
            parent_node.children.retain(|c| *c != node);
        }

        let mut removed = vec![node];
        removed.extend(self.descendants(node));
        for id in &removed {
            if let Some(slot) = self.nodes.get_mut(id.0) {
                *slot = None;
            }
        }
        self.deactivated.retain(|id| !removed.contains(id));
        Ok(removed)
    }

    /// Move a node to `index` among its siblings.
    pub fn set_sibling_index(&mut self, node: NodeId, index: usize) -> Result<(), GraphError> {
        let parent = self
            .node(node)
            .ok_or(GraphError::UnknownNode(node))?
            .parent
            .ok_or(GraphError::NoParent(node))?;
        let siblings = &mut self
            .node_mut(parent)
            .ok_or(GraphError::UnknownNode(parent))?
            .children;
        if index >= siblings.len() {
            return Err(GraphError::SiblingIndexOutOfRange {
                index,
                count: siblings.len(),
            });
        }
        siblings.retain(|c| *c != node);
        siblings.insert(index, node);
        Ok(())
    }

    /// Whether `node` names a live node.
    pub fn contains(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    /// Active flag of the node and all of its ancestors.
    pub fn is_active_in_hierarchy(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            match self.node(id) {
                Some(n) if n.active => cursor = n.parent,
                _ => return false,
            }
        }
        true
    }

    /// Direct children in order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Every node below `node`, depth first, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Live nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| NodeId(i))
    }

    /// Live nodes without a parent, in creation order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().filter(|id| self.parent(*id).is_none())
    }

    /// Turn the deactivation journal on or off. Turning it off discards
    /// anything still queued.
    pub fn track_deactivations(&mut self, enabled: bool) {
        self.tracking = enabled;
        if !enabled {
            self.deactivated.clear();
        }
    }

    pub fn is_tracking_deactivations(&self) -> bool {
        self.tracking
    }

    /// Drain the deactivation journal, oldest first.
    pub fn take_deactivated(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.deactivated)
    }

    fn insert(&mut self, name: String, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            name,
            parent,
            children: Vec::new(),
            active: true,
        }));
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }
}

impl Hierarchy for SceneGraph {
    fn name(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.name.as_str())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.children(node).len()
    }

    fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.children(node).get(index).copied()
    }

    fn is_active(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|n| n.active)
    }

    fn set_active(&mut self, node: NodeId, active: bool) {
        if self.tracking && !active && self.is_active_in_hierarchy(node) {
            let affected: Vec<NodeId> = self
                .descendants(node)
                .into_iter()
                .filter(|id| self.is_active_in_hierarchy(*id))
                .collect();
            self.deactivated.push(node);
            self.deactivated.extend(affected);
        }
        if let Some(n) = self.node_mut(node) {
            n.active = active;
        }
    }

    fn sibling_index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|c| *c == node)
    }
}
