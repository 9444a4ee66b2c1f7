//! Step loop, progression, and persistence for the homestead simulation.
//!
//! This crate ties the economy and world crates together into one
//! [`Simulation`] that owns all mutable state and advances it in a fixed
//! per-frame order: terrain generation, then production updates, then the
//! progression check.
//!
//! # Modules
//!
//! - [`clock`] -- Step counter and elapsed simulated time.
//! - [`config`] -- Configuration loading from `homestead-config.yaml` into
//!   strongly-typed structs.
//! - [`progression`] -- The monotonic civilization level and its
//!   transition table.
//! - [`simulation`] -- The step loop and the command and query surfaces.
//! - [`snapshot`] -- Serializable snapshots and restore.

pub mod clock;
pub mod config;
pub mod progression;
pub mod simulation;
pub mod snapshot;

pub use clock::{ClockError, SimClock};
pub use config::{ConfigError, SimulationConfig};
pub use progression::{ProgressionAggregates, ProgressionGate, Requirement};
pub use simulation::{Simulation, StepSummary};
pub use snapshot::{SNAPSHOT_VERSION, SnapshotError, WorldSnapshot};
