//! Headless engine binary for the homestead simulation.
//!
//! This is the main entry point that wires together configuration, the
//! item catalog, the simulation step loop, and the scripted homesteader.
//! It runs a bounded number of steps and writes the final world snapshot.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `homestead-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the item catalog, falling back to the built-in one
//! 4. Create the world, or restore it from the snapshot given as the first
//!    command-line argument
//! 5. Run the step loop with the homesteader acting after every step
//! 6. Write the final snapshot and log the result

mod autopilot;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use homestead_core::{Simulation, SimulationConfig, WorldSnapshot};
use homestead_economy::load_or_builtin;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::autopilot::Homesteader;
use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "homestead-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, restore, or the final snapshot write
/// fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so remember whether the
    //    file existed and report it afterwards.
    let config_path = Path::new(CONFIG_FILE);
    let config_found = config_path.exists();
    let config = if config_found {
        SimulationConfig::from_file(config_path)?
    } else {
        SimulationConfig::default()
    };

    // 2. Initialize structured logging.
    init_logging(&config.logging.level)?;
    info!("homestead-engine starting");
    if !config_found {
        info!("Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        max_steps = config.simulation.max_steps,
        step_seconds = config.simulation.step_seconds,
        "Configuration loaded"
    );

    // 3. Load the catalog.
    let (catalog, report) = load_or_builtin(&config.catalog.path);
    info!(
        path = %config.catalog.path.display(),
        items = catalog.item_count(),
        species = catalog.species_count(),
        rows_skipped = report.rows_skipped,
        defaults_backfilled = report.defaults_backfilled,
        used_builtin = report.used_builtin,
        "Catalog loaded"
    );
    let catalog = Arc::new(catalog);

    // 4. Create or restore the world.
    let snapshot_path = config.simulation.snapshot_path.clone();
    let mut sim = match resume_path() {
        Some(path) => {
            let snapshot = WorldSnapshot::read_from(&path)?;
            info!(path = %path.display(), saved_at = %snapshot.saved_at, "Resuming from snapshot");
            Simulation::restore(snapshot, config, catalog)?
        }
        None => Simulation::new(config, catalog),
    };

    // 5. Run the step loop.
    let mut homesteader = Homesteader::default();
    run(&mut sim, &mut homesteader);

    // 6. Write the final snapshot.
    let snapshot = sim.snapshot();
    snapshot.write_to(&snapshot_path)?;

    info!(
        steps = sim.clock().step(),
        elapsed_seconds = sim.clock().elapsed_seconds(),
        chunks = sim.grid().generated_chunk_count(),
        level = %sim.civilization_level(),
        civilization = sim.civilization_name(),
        ending_available = sim.is_ending_available(),
        commands = homesteader.commands_issued(),
        snapshot = %snapshot_path.display(),
        "homestead-engine shutdown complete"
    );
    Ok(())
}

/// Install the `fmt` subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(default_level: &str) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| EngineError::Logging {
            message: e.to_string(),
        })
}

/// Snapshot to resume from, if one was passed on the command line.
fn resume_path() -> Option<PathBuf> {
    std::env::args_os().nth(1).map(PathBuf::from)
}

/// Run `max_steps` steps, letting the homesteader act after each one.
fn run(sim: &mut Simulation, homesteader: &mut Homesteader) {
    let max_steps = sim.config().simulation.max_steps;
    let step_seconds = sim.config().simulation.step_seconds;
    let view_radius = sim.config().simulation.view_radius;

    for _ in 0..max_steps {
        let viewport = sim.player_viewport(view_radius);
        let summary = sim.step(step_seconds, viewport);
        if summary.chunks_generated > 0 {
            info!(
                step = summary.step,
                chunks = summary.chunks_generated,
                total_chunks = sim.grid().generated_chunk_count(),
                "Generated terrain around the player"
            );
        }
        if let Some(level) = summary.level_up {
            info!(step = summary.step, %level, name = level.name(), "Level reached");
            if let Some(next) = sim.next_requirement() {
                info!(requirement = %next, "Next goal");
            }
        }
        let _ = homesteader.act(sim);

        if sim.is_ending_available() {
            info!(step = summary.step, "Ending available, stopping early");
            break;
        }
    }
}
