//! Builder for machines and their states.

use crate::builder::error::BuildError;
use crate::config::MachineConfig;
use crate::core::NodeId;
use crate::machine::StateRef;
use crate::scene::Scene;
use std::collections::HashSet;

/// Fluent description of a container, its states, and its configuration.
///
/// # Example
///
/// ```rust
/// use scenestate::builder::MachineBuilder;
/// use scenestate::scene::Scene;
///
/// let mut scene = Scene::new();
/// let menu = MachineBuilder::new("Menu")
///     .states(["Title", "Options", "Credits"])
///     .default_state("Title")
///     .verbose(false)
///     .build(&mut scene)
///     .unwrap();
///
/// scene.run();
/// let machine = scene.machine(menu).unwrap();
/// assert!(machine.at_first());
/// ```
#[derive(Clone, Debug)]
pub struct MachineBuilder {
    name: String,
    parent: Option<NodeId>,
    states: Vec<String>,
    config: MachineConfig,
}

impl MachineBuilder {
    /// Create a builder for a container with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            states: Vec::new(),
            config: MachineConfig::default(),
        }
    }

    /// Spawn the container under `parent` instead of as a root.
    pub fn parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Append one state.
    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.states.push(name.into());
        self
    }

    /// Append several states in order.
    pub fn states<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn default_state(mut self, state: impl Into<StateRef>) -> Self {
        self.config.default_state = Some(state.into());
        self
    }

    pub fn allow_reentry(mut self, allow: bool) -> Self {
        self.config.allow_reentry = allow;
        self
    }

    pub fn return_to_default_on_disable(mut self, enabled: bool) -> Self {
        self.config.return_to_default_on_disable = enabled;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Replace the whole configuration, e.g. one loaded from JSON.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawn the container and its states into `scene` and register the
    /// machine. Returns the container id.
    pub fn build(self, scene: &mut Scene) -> Result<NodeId, BuildError> {
        self.check()?;

        let container = match self.parent {
            Some(parent) => scene.spawn_child(parent, self.name)?,
            None => scene.spawn(self.name),
        };
        for state in self.states {
            scene.spawn_child(container, state)?;
        }
        scene.add_machine(container, self.config)?;
        Ok(container)
    }

    fn check(&self) -> Result<(), BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates {
                machine: self.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.states.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(BuildError::DuplicateStateName {
                machine: self.name.clone(),
                name: duplicate.clone(),
            });
        }

        // Node ids do not exist until the states are spawned.
        let known = match &self.config.default_state {
            None => true,
            Some(StateRef::Index(index)) => *index < self.states.len(),
            Some(StateRef::Name(name)) => self.states.contains(name),
            Some(StateRef::Node(_)) => false,
        };
        if !known {
            return Err(BuildError::UnknownDefaultState {
                machine: self.name.clone(),
                target: self
                    .config
                    .default_state
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GraphError, Hierarchy};
    use crate::scene::SceneError;

    #[test]
    fn builder_requires_states() {
        let mut scene = Scene::new();
        let result = MachineBuilder::new("Empty").build(&mut scene);

        assert!(matches!(result, Err(BuildError::NoStates { .. })));
        assert_eq!(scene.graph().nodes().count(), 0);
    }

    #[test]
    fn builder_rejects_duplicate_names() {
        let mut scene = Scene::new();
        let result = MachineBuilder::new("Menu")
            .states(["A", "B", "A"])
            .build(&mut scene);

        assert_eq!(
            result,
            Err(BuildError::DuplicateStateName {
                machine: "Menu".into(),
                name: "A".into(),
            })
        );
    }

    #[test]
    fn builder_rejects_unknown_default() {
        let mut scene = Scene::new();

        let by_name = MachineBuilder::new("Menu")
            .states(["A", "B"])
            .default_state("C")
            .build(&mut scene);
        let by_index = MachineBuilder::new("Menu")
            .states(["A", "B"])
            .default_state(2usize)
            .build(&mut scene);

        assert!(matches!(by_name, Err(BuildError::UnknownDefaultState { .. })));
        assert!(matches!(by_index, Err(BuildError::UnknownDefaultState { .. })));
        assert_eq!(scene.graph().nodes().count(), 0);
    }

    #[test]
    fn unknown_parent_leaves_scene_untouched() {
        let mut scene = Scene::new();
        let ghost = scene.spawn("Ghost");
        scene.despawn(ghost).unwrap();

        let result = MachineBuilder::new("Menu")
            .parent(ghost)
            .state("A")
            .build(&mut scene);

        assert_eq!(
            result,
            Err(BuildError::Scene(SceneError::Graph(GraphError::UnknownNode(
                ghost
            ))))
        );
        assert_eq!(scene.graph().nodes().count(), 0);
    }

    #[test]
    fn build_spawns_states_in_order() {
        let mut scene = Scene::new();
        let ui = scene.spawn("Ui");

        let menu = MachineBuilder::new("Menu")
            .parent(ui)
            .state("Title")
            .states(["Options", "Credits"])
            .default_state(1usize)
            .allow_reentry(true)
            .return_to_default_on_disable(false)
            .verbose(false)
            .build(&mut scene)
            .unwrap();

        let graph = scene.graph();
        assert_eq!(graph.parent(menu), Some(ui));
        let names: Vec<_> = graph
            .children(menu)
            .iter()
            .filter_map(|child| graph.name(*child))
            .collect();
        assert_eq!(names, vec!["Title", "Options", "Credits"]);

        let config = scene.machine(menu).unwrap().config();
        assert_eq!(config.default_state, Some(StateRef::Index(1)));
        assert!(config.allow_reentry);
        assert!(!config.return_to_default_on_disable);
    }

    #[test]
    fn config_replaces_previous_settings() {
        let mut scene = Scene::new();
        let config = MachineConfig::from_json(r#"{ "default_state": { "name": "B" }, "verbose": false }"#)
            .unwrap();

        let menu = MachineBuilder::new("Menu")
            .allow_reentry(true)
            .states(["A", "B"])
            .config(config)
            .build(&mut scene)
            .unwrap();
        scene.run();

        let machine = scene.machine(menu).unwrap();
        assert!(!machine.config().allow_reentry);
        assert_eq!(
            machine.current_state(),
            scene.graph().find_child(menu, "B")
        );
    }
}
