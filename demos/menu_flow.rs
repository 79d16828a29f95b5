//! Menu Flow
//!
//! This example walks a three-page menu forwards and back.
//!
//! Key concepts:
//! - Building a machine and its states in one step
//! - Boundary notifications when the first or last page is entered or left
//! - Rejected transitions leave the machine where it was
//! - Disabling the menu sends it back to its default page
//!
//! Run with: RUST_LOG=info cargo run --example menu_flow

use scenestate::{Hierarchy, MachineBuilder, MachineEvent, Scene};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Menu Flow ===\n");

    let mut scene = Scene::new();
    let menu = MachineBuilder::new("Menu")
        .states(["Title", "Options", "Credits"])
        .default_state("Title")
        .build(&mut scene)?;

    if let Some(machine) = scene.machine_mut(menu) {
        machine.subscribe(|event| match event {
            MachineEvent::FirstStateEntered(_) => println!("  back button hidden"),
            MachineEvent::FirstStateExited(_) => println!("  back button shown"),
            MachineEvent::LastStateEntered(_) => println!("  next button hidden"),
            MachineEvent::LastStateExited(_) => println!("  next button shown"),
            _ => {}
        });
    }

    let report = scene.run();
    println!("Started machines: {}", report.started.len());

    println!("\nForward:");
    for _ in 0..3 {
        let page = scene.next(menu)?;
        println!("  on {}", scene.graph().name(page).unwrap_or("?"));
    }

    println!("\nJump to a page that does not exist:");
    if let Err(error) = scene.change_state(menu, "Extras") {
        println!("  refused: {error}");
    }

    println!("\nHide and show the menu:");
    scene.set_active(menu, false)?;
    scene.set_active(menu, true)?;

    if let Some(machine) = scene.machine(menu) {
        for state in machine.states(scene.graph()) {
            let marker = if state.current { ">" } else { " " };
            println!("  {marker} {} {}", state.index, state.name);
        }
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
