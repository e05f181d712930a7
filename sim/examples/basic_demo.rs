//! Basic demonstration of the beaker simulation.
//!
//! Run with: cargo run --example basic_demo

use beaker_sim::{BeakerSim, ParticleKind};

fn main() {
    println!("=== Virtual Beaker - Simulation Demo ===\n");

    let mut sim = BeakerSim::new();
    sim.set_beaker_bounds([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]);

    println!("Initial state:");
    print_snapshot(&mut sim);

    println!("\n--- Pouring water, then copper sulfate ---\n");
    pour(&mut sim, "h2o", 30);
    pour(&mut sim, "cuso4", 10);

    println!("\n--- Adding sodium hydroxide ---\n");
    report(sim.add_chemical("naoh"));
    run(&mut sim, 60);

    println!("\n--- Dropping in potassium ---\n");
    report(sim.add_chemical("k"));
    run(&mut sim, 120);

    println!("\n--- Heating and stirring ---\n");
    for _ in 0..4 {
        sim.heat_up();
    }
    sim.toggle_stir();
    run(&mut sim, 60);

    println!("\n=== Final State (JSON) ===\n");
    match sim.snapshot().to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("snapshot failed: {}", err),
    }

    sim.clear();
    println!("\nAfter clear: {} particles", sim.total_particles());
}

/// Hold the pour gesture for `ticks` frames.
fn pour(sim: &mut BeakerSim, id: &str, ticks: u32) {
    if let Err(err) = sim.select_chemical(id) {
        eprintln!("{}", err);
        return;
    }
    report(sim.begin_pour(0.5, 0.5));
    run(sim, ticks);
    sim.end_pour();
}

fn report(result: Result<beaker_sim::MixOutcome, beaker_sim::PourError>) {
    match result {
        Ok(outcome) => match outcome.reaction {
            Some(text) => println!("  + {:.0} {} -> {}", outcome.added, outcome.chemical_id, text),
            None => println!("  + {:.0} {}", outcome.added, outcome.chemical_id),
        },
        Err(err) => println!("  ! {}", err),
    }
}

fn run(sim: &mut BeakerSim, ticks: u32) {
    for _ in 0..ticks {
        sim.step(1.0 / 60.0);
    }
    println!("--- Tick {} (t={:.2}s) ---", sim.current_tick(), sim.current_time());
    print_snapshot(sim);
}

fn print_snapshot(sim: &mut BeakerSim) {
    let snapshot = sim.snapshot();

    if let Some(liquid) = &snapshot.liquid {
        println!(
            "  volume={:.0}/{:.0} pH={:.1} temp={:.0}C color={}",
            liquid.total_volume,
            liquid.max_volume,
            liquid.ph,
            liquid.temperature,
            liquid.color.map_or("-".to_string(), |c| c.to_hex()),
        );
    }
    println!(
        "  surface: amp={:.4} ripple={:.4} turbulence={:.4}",
        snapshot.surface.amplitude, snapshot.surface.ripple, snapshot.surface.turbulence
    );
    for kind in ParticleKind::ALL {
        println!("  {:<12} {}", kind.as_str(), snapshot.particles_of(kind).count());
    }
    for row in &snapshot.contents {
        println!("  {:<8} {:>6.2} mol  {}", row.formula, row.moles, row.display_amount);
    }
    for message in &snapshot.notifications {
        println!("  [{}]", message);
    }
}
