//! Terrain and tile-bound production for the homestead simulation.
//!
//! This crate models the physical world: an unbounded tile grid generated
//! chunk by chunk from a fixed seed, tool-driven terrain conversion, and the
//! production entities that live on tiles (farm plots, livestock pens,
//! buildings). Item data comes from `homestead-economy` through an injected
//! read-only catalog.
//!
//! # Modules
//!
//! - [`generator`] -- Deterministic noise + chunk-stream terrain generator.
//! - [`world_grid`] -- [`WorldGrid`]: generated tiles keyed by coordinate,
//!   lazy generation around the viewport, water-proximity queries.
//! - [`conversion`] -- [`TerrainConversionEngine`]: the tool transition graph
//!   and best-tool lookup.
//! - [`farming`] -- [`FarmRegistry`]: planting, growth stages, harvest.
//! - [`livestock`] -- [`PenRegistry`]: animal growth, product loop, slaughter.
//! - [`structure`] -- [`BuildingRegistry`] and the building blueprint table.

pub mod conversion;
pub mod farming;
pub mod generator;
pub mod livestock;
pub mod structure;
pub mod world_grid;

// Re-export primary types at crate root.
pub use conversion::{
    ConversionOutcome, DEFAULT_WATER_SEARCH_RADIUS, TerrainConversionEngine, transition,
};
pub use farming::{DEFAULT_CROP_STAGE_SECONDS, FarmPlot, FarmRegistry, HARVESTABLE_STAGE};
pub use generator::{GeneratorSettings, TerrainGenerator};
pub use livestock::{DEFAULT_LIVESTOCK_STAGE_SECONDS, LivestockPen, MATURE_STAGE, PenRegistry};
pub use structure::{Building, BuildingBlueprint, BuildingRegistry, blueprint};
pub use world_grid::{DEFAULT_VIEW_MARGIN, TerrainTile, WorldGrid};
