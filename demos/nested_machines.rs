//! Nested Machines
//!
//! This example puts a settings machine inside one state of a game machine.
//!
//! Key concepts:
//! - A state can itself be the container of another machine
//! - Leaving the outer state disables the inner container
//! - The inner machine returns to its default page when disabled
//! - Components opt into one-time setup through `Bootstrappable`
//!
//! Run with: RUST_LOG=debug cargo run --example nested_machines

use scenestate::{Bootstrappable, Hierarchy, MachineBuilder, NodeId, Scene, SceneGraph};
use tracing_subscriber::EnvFilter;

struct AudioMixer {
    channels: usize,
}

impl Bootstrappable for AudioMixer {
    fn initialize(&mut self, node: NodeId) {
        self.channels = 8;
        println!("Audio mixer on {node} ready with {} channels", self.channels);
    }
}

fn current(scene: &Scene, container: NodeId) -> String {
    let graph: &SceneGraph = scene.graph();
    scene
        .machine(container)
        .and_then(|machine| machine.current_state())
        .and_then(|state| graph.name(state))
        .unwrap_or("none")
        .to_string()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Nested Machines ===\n");

    let mut scene = Scene::new();
    let game = MachineBuilder::new("Game")
        .states(["Menu", "Playing", "Paused"])
        .default_state("Menu")
        .build(&mut scene)?;
    let menu = scene
        .graph()
        .find_child(game, "Menu")
        .ok_or("menu state missing")?;
    let settings = MachineBuilder::new("Settings")
        .parent(menu)
        .states(["Audio", "Video", "Controls"])
        .default_state("Audio")
        .build(&mut scene)?;

    let mixer = scene.spawn("Mixer");
    scene.attach(mixer, AudioMixer { channels: 0 })?;

    let report = scene.run();
    println!(
        "Bootstrapped {} containers, started {}",
        report.attached.len(),
        report.started.len()
    );

    scene.next(settings)?;
    scene.next(settings)?;
    println!("Settings page: {}", current(&scene, settings));

    scene.change_state(game, "Playing")?;
    println!("Game: {}", current(&scene, game));
    println!("Settings page after leaving the menu: {}", current(&scene, settings));

    scene.previous(game)?;
    println!("Game: {}", current(&scene, game));

    println!("\nGame history:");
    if let Some(machine) = scene.machine(game) {
        for record in machine.history().transitions() {
            let name = |id: Option<NodeId>| {
                id.and_then(|id| scene.graph().name(id))
                    .unwrap_or("none")
                    .to_string()
            };
            println!("  {} -> {}", name(record.from), name(record.to));
        }
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
