//! Per-state façade.
//!
//! A [`StateNode`] stands for one state of some machine and forwards every
//! request to whichever machine owns its parent container. It never holds
//! the machine itself, only the container id it last resolved, checked
//! against the current parent on every use.

use super::{Scene, SceneError};
use crate::core::{Hierarchy, NodeId, SceneGraph};
use crate::machine::{label, StateMachine, StateRef, TransitionError};
use std::cell::Cell;
use tracing::error;

#[derive(Debug)]
pub struct StateNode {
    node: NodeId,
    owner: Cell<Option<NodeId>>,
}

impl StateNode {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            owner: Cell::new(None),
        }
    }

    pub fn id(&self) -> NodeId {
        self.node
    }

    /// Whether this state sits first among its siblings.
    pub fn is_first<H: Hierarchy>(&self, graph: &H) -> bool {
        graph.sibling_index(self.node) == Some(0)
    }

    /// Whether this state sits last among its siblings.
    pub fn is_last<H: Hierarchy>(&self, graph: &H) -> bool {
        let Some(parent) = graph.parent(self.node) else {
            return false;
        };
        let count = graph.child_count(parent);
        count > 0 && graph.sibling_index(self.node) == Some(count - 1)
    }

    /// Container of the machine this state belongs to.
    ///
    /// Logs an error when the parent carries no machine: states must be
    /// direct children of a machine to operate.
    pub fn owner(&self, scene: &Scene) -> Result<NodeId, TransitionError> {
        let parent = scene.graph().parent(self.node);
        if let Some(cached) = self.owner.get() {
            if parent == Some(cached) && scene.machine(cached).is_some() {
                return Ok(cached);
            }
        }

        match parent.filter(|p| scene.machine(*p).is_some()) {
            Some(owner) => {
                self.owner.set(Some(owner));
                Ok(owner)
            }
            None => {
                self.owner.set(None);
                let state = label(scene.graph(), self.node);
                error!(%state, "states must be the child of a state machine to operate");
                Err(TransitionError::NoOwningMachine { state })
            }
        }
    }

    /// The owning machine, if there is one.
    pub fn machine<'s>(&self, scene: &'s Scene) -> Option<&'s StateMachine> {
        self.owner(scene).ok().and_then(|owner| scene.machine(owner))
    }

    pub fn change_state(
        &self,
        scene: &mut Scene,
        target: impl Into<StateRef>,
    ) -> Result<NodeId, TransitionError> {
        let target = target.into();
        self.delegate(scene, |machine, graph| machine.change_state(graph, target))
    }

    /// Make this state the current one.
    pub fn enter(&self, scene: &mut Scene) -> Result<NodeId, TransitionError> {
        self.change_state(scene, self.node)
    }

    pub fn next(&self, scene: &mut Scene) -> Result<NodeId, TransitionError> {
        self.delegate(scene, |machine, graph| machine.next(graph))
    }

    pub fn previous(&self, scene: &mut Scene) -> Result<NodeId, TransitionError> {
        self.delegate(scene, |machine, graph| machine.previous(graph))
    }

    pub fn exit(&self, scene: &mut Scene) -> Result<(), TransitionError> {
        self.delegate(scene, |machine, graph| {
            machine.exit(graph);
            Ok(())
        })
    }

    fn delegate<T, F>(&self, scene: &mut Scene, op: F) -> Result<T, TransitionError>
    where
        F: FnOnce(&mut StateMachine, &mut SceneGraph) -> Result<T, TransitionError>,
    {
        let owner = self.owner(scene)?;
        match scene.route(owner, op) {
            Ok(result) => result,
            Err(SceneError::NotRunning(_)) => Err(TransitionError::NotRunning {
                machine: label(scene.graph(), owner),
            }),
            Err(_) => Err(TransitionError::NoOwningMachine {
                state: label(scene.graph(), self.node),
            }),
        }
    }
}

impl From<NodeId> for StateNode {
    fn from(node: NodeId) -> Self {
        Self::new(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;

    fn scene() -> (Scene, NodeId, Vec<NodeId>) {
        let mut scene = Scene::new();
        let root = scene.spawn("Menu");
        let states = ["Title", "Options", "Credits"]
            .iter()
            .map(|name| scene.spawn_child(root, *name).unwrap())
            .collect();
        scene
            .add_machine(root, MachineConfig::default().verbose(false))
            .unwrap();
        scene.run();
        (scene, root, states)
    }

    #[test]
    fn position_is_derived_from_siblings() {
        let (mut scene, _, s) = scene();
        let title = StateNode::new(s[0]);
        let credits = StateNode::new(s[2]);

        assert!(title.is_first(scene.graph()));
        assert!(!title.is_last(scene.graph()));
        assert!(credits.is_last(scene.graph()));

        scene.graph_mut().set_sibling_index(s[2], 0).unwrap();
        assert!(credits.is_first(scene.graph()));
        assert!(!title.is_first(scene.graph()));
    }

    #[test]
    fn delegates_to_owning_machine() {
        let (mut scene, root, s) = scene();
        let options = StateNode::new(s[1]);

        assert_eq!(options.owner(&scene), Ok(root));
        assert_eq!(options.enter(&mut scene), Ok(s[1]));
        assert_eq!(options.next(&mut scene), Ok(s[2]));
        assert_eq!(options.previous(&mut scene), Ok(s[1]));
        assert_eq!(options.change_state(&mut scene, "Title"), Ok(s[0]));
        assert_eq!(options.exit(&mut scene), Ok(()));
        assert_eq!(options.machine(&scene).and_then(|m| m.current_state()), None);
    }

    #[test]
    fn node_without_machine_reports_configuration_error() {
        let mut scene = Scene::new();
        let loose = scene.spawn("Loose");
        let state = StateNode::new(scene.spawn_child(loose, "Orphan").unwrap());

        assert_eq!(
            state.next(&mut scene),
            Err(TransitionError::NoOwningMachine {
                state: "Orphan".into()
            })
        );
        assert!(state.machine(&scene).is_none());

        let root = StateNode::new(loose);
        assert!(matches!(
            root.exit(&mut scene),
            Err(TransitionError::NoOwningMachine { .. })
        ));
    }

    #[test]
    fn delegation_waits_for_running_scene() {
        let mut scene = Scene::new();
        let root = scene.spawn("Menu");
        let title = StateNode::new(scene.spawn_child(root, "Title").unwrap());
        scene
            .add_machine(
                root,
                MachineConfig::default()
                    .with_default_state("Title")
                    .verbose(false),
            )
            .unwrap();

        assert_eq!(
            title.enter(&mut scene),
            Err(TransitionError::NotRunning {
                machine: "Menu".into()
            })
        );

        scene.run();
        assert!(scene.graph().is_active(title.id()));
        assert_eq!(title.machine(&scene).unwrap().current_state(), Some(title.id()));
    }

    #[test]
    fn owner_follows_reparenting() {
        let (mut scene, _, s) = scene();
        let title = StateNode::new(s[0]);
        assert!(title.owner(&scene).is_ok());

        let other = scene.spawn("Other");
        let moved = scene.spawn_child(other, "Title").unwrap();
        scene.despawn(s[0]).unwrap();
        let moved = StateNode::new(moved);

        assert!(title.owner(&scene).is_err());
        assert!(moved.owner(&scene).is_err());
        scene
            .add_machine(other, MachineConfig::default().verbose(false))
            .unwrap();
        assert_eq!(moved.owner(&scene), Ok(other));
    }
}
