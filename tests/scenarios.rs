//! End-to-end scenarios through the public API.

use scenestate::{
    Bootstrappable, Hierarchy, MachineBuilder, MachineConfig, MachineEvent, NodeId, Scene,
    SceneError, StateNode, TransitionError,
};
use std::sync::{Arc, Mutex};

fn record(scene: &mut Scene, container: NodeId) -> Arc<Mutex<Vec<MachineEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    scene
        .machine_mut(container)
        .unwrap()
        .subscribe(move |event| sink.lock().unwrap().push(*event));
    events
}

fn drain(events: &Arc<Mutex<Vec<MachineEvent>>>) -> Vec<MachineEvent> {
    std::mem::take(&mut *events.lock().unwrap())
}

fn abc(scene: &mut Scene, builder: MachineBuilder) -> (NodeId, NodeId, NodeId, NodeId) {
    let root = builder
        .states(["A", "B", "C"])
        .verbose(false)
        .build(scene)
        .unwrap();
    let graph = scene.graph();
    let find = |name| graph.find_child(root, name).unwrap();
    (root, find("A"), find("B"), find("C"))
}

#[test]
fn walking_forward_through_three_states() {
    let mut scene = Scene::new();
    let (menu, a, b, c) = abc(&mut scene, MachineBuilder::new("Menu"));
    scene.run();
    let events = record(&mut scene, menu);

    assert_eq!(scene.next(menu), Ok(a));
    assert_eq!(
        drain(&events),
        vec![MachineEvent::FirstStateEntered(a), MachineEvent::StateEntered(a)]
    );

    assert_eq!(scene.next(menu), Ok(b));
    assert_eq!(
        drain(&events),
        vec![
            MachineEvent::FirstStateExited(a),
            MachineEvent::StateExited(a),
            MachineEvent::StateEntered(b),
        ]
    );

    scene.next(menu).unwrap();
    assert_eq!(scene.next(menu), Ok(c));
    assert!(scene.machine(menu).unwrap().at_last());
    drain(&events);

    assert_eq!(scene.next(menu), Ok(c));
    assert!(drain(&events).is_empty());
}

#[test]
fn default_state_entered_on_run() {
    let mut scene = Scene::new();
    let menu = MachineBuilder::new("Menu")
        .states(["A", "B"])
        .default_state("A")
        .verbose(false)
        .build(&mut scene)
        .unwrap();
    let a = scene.graph().find_child(menu, "A").unwrap();

    let report = scene.run();

    let machine = scene.machine(menu).unwrap();
    assert_eq!(report.started, vec![menu]);
    assert_eq!(machine.current_state(), Some(a));
    assert!(machine.at_first());
    assert!(!machine.at_last());
}

#[test]
fn unknown_name_leaves_machine_untouched() {
    let mut scene = Scene::new();
    let (menu, _, b, _) = abc(&mut scene, MachineBuilder::new("Menu"));
    scene.run();
    scene.change_state(menu, "B").unwrap();
    let events = record(&mut scene, menu);

    let result = scene.change_state(menu, "D");

    assert_eq!(
        result,
        Err(SceneError::Transition(TransitionError::NameNotFound {
            machine: "Menu".into(),
            name: "D".into(),
        }))
    );
    assert_eq!(scene.machine(menu).unwrap().current_state(), Some(b));
    assert!(drain(&events).is_empty());
}

#[test]
fn reentry_gate_in_both_settings() {
    let mut scene = Scene::new();
    let (strict, _, b, _) = abc(&mut scene, MachineBuilder::new("Strict"));
    let (lenient, _, b2, _) = abc(&mut scene, MachineBuilder::new("Lenient").allow_reentry(true));
    scene.run();
    scene.change_state(strict, b).unwrap();
    scene.change_state(lenient, b2).unwrap();
    let strict_events = record(&mut scene, strict);
    let lenient_events = record(&mut scene, lenient);

    let refused = scene.change_state(strict, b);
    let repeated = scene.change_state(lenient, b2);

    assert!(matches!(
        refused,
        Err(SceneError::Transition(ref error)) if error.is_reentry()
    ));
    assert!(drain(&strict_events).is_empty());
    assert_eq!(repeated, Ok(b2));
    assert_eq!(
        drain(&lenient_events),
        vec![MachineEvent::StateExited(b2), MachineEvent::StateEntered(b2)]
    );
}

#[test]
fn disabling_container_restores_default_from_any_state() {
    let mut scene = Scene::new();
    let (menu, a, _, c) = abc(&mut scene, MachineBuilder::new("Menu").default_state("A"));
    scene.run();

    scene.change_state(menu, c).unwrap();
    scene.set_active(menu, false).unwrap();
    assert_eq!(scene.machine(menu).unwrap().current_state(), Some(a));

    scene.set_active(menu, true).unwrap();
    scene.exit(menu).unwrap();
    scene.set_active(menu, false).unwrap();
    assert_eq!(scene.machine(menu).unwrap().current_state(), Some(a));
}

#[test]
fn disable_during_composition_is_ignored() {
    let mut scene = Scene::new();
    let (menu, _, _, _) = abc(&mut scene, MachineBuilder::new("Menu").default_state("B"));

    scene.set_active(menu, false).unwrap();
    scene.set_active(menu, true).unwrap();
    assert_eq!(scene.machine(menu).unwrap().current_state(), None);

    scene.run();
    let b = scene.graph().find_child(menu, "B");
    assert_eq!(scene.machine(menu).unwrap().current_state(), b);
}

#[test]
fn state_nodes_drive_their_machine() {
    let mut scene = Scene::new();
    let (menu, a, b, c) = abc(&mut scene, MachineBuilder::new("Menu"));
    scene.run();
    let first = StateNode::new(a);
    let last = StateNode::from(c);

    assert!(first.is_first(scene.graph()));
    assert!(last.is_last(scene.graph()));
    assert_eq!(last.enter(&mut scene), Ok(c));
    assert_eq!(first.previous(&mut scene), Ok(b));
    assert_eq!(first.change_state(&mut scene, 0usize), Ok(a));
    assert_eq!(first.machine(&scene).map(|m| m.container()), Some(menu));
}

#[test]
fn bootstrap_components_initialize_once() {
    struct Audio(Arc<Mutex<Vec<NodeId>>>);

    impl Bootstrappable for Audio {
        fn initialize(&mut self, node: NodeId) {
            self.0.lock().unwrap().push(node);
        }
    }

    let mut scene = Scene::new();
    let manager = scene.spawn("AudioManager");
    let calls = Arc::new(Mutex::new(Vec::new()));
    scene.attach(manager, Audio(Arc::clone(&calls))).unwrap();

    scene.bootstrap();
    scene.run();
    scene.bootstrap();

    assert_eq!(*calls.lock().unwrap(), vec![manager]);
}

#[test]
fn nested_machines_return_to_defaults_together() {
    let mut scene = Scene::new();
    let game = MachineBuilder::new("Game")
        .states(["Menu", "Play"])
        .default_state("Menu")
        .verbose(false)
        .build(&mut scene)
        .unwrap();
    let menu = scene.graph().find_child(game, "Menu").unwrap();
    let page = scene.spawn_child(menu, "Page").unwrap();
    let title = scene.spawn_child(page, "Title").unwrap();
    scene.spawn_child(page, "Options").unwrap();
    scene
        .add_machine(
            page,
            MachineConfig::default()
                .with_default_state("Title")
                .verbose(false),
        )
        .unwrap();
    scene.run();
    scene.next(page).unwrap();
    assert_ne!(scene.machine(page).unwrap().current_state(), Some(title));

    scene.next(game).unwrap();

    assert!(!scene.graph().is_active_in_hierarchy(page));
    assert_eq!(scene.machine(page).unwrap().current_state(), Some(title));
}

#[test]
fn config_loaded_from_json_drives_startup() {
    let config = MachineConfig::from_json(
        r#"{ "default_state": { "index": 2 }, "allow_reentry": true, "verbose": false }"#,
    )
    .unwrap();
    let mut scene = Scene::new();
    let (menu, _, _, c) = abc(&mut scene, MachineBuilder::new("Menu").config(config));

    scene.run();

    let machine = scene.machine(menu).unwrap();
    assert_eq!(machine.current_state(), Some(c));
    assert!(machine.at_last());
    assert_eq!(machine.history().get_path(), vec![None, Some(c)]);
}
