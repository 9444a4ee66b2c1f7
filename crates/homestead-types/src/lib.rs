//! Shared type definitions for the Homestead world simulation.
//!
//! This crate is the single source of truth for the value types passed
//! between the economy, world, and core crates, and for the types exported
//! to the presentation layer via `ts-rs`.
//!
//! # Modules
//!
//! - [`coords`] -- Tile, chunk, and viewport coordinates on the unbounded grid
//! - [`enums`] -- Terrain, tool class, item category, building, and rejection enums
//! - [`ids`] -- Type-safe wrappers for catalog item and species ids
//! - [`level`] -- The monotonic [`CivilizationLevel`] counter
//! - [`terrain`] -- The data-driven [`TerrainAttributes`] table
//!
//! [`CivilizationLevel`]: level::CivilizationLevel
//! [`TerrainAttributes`]: terrain::TerrainAttributes

pub mod coords;
pub mod enums;
pub mod ids;
pub mod level;
pub mod terrain;

// Re-export all public types at crate root for convenience.
pub use coords::{CHUNK_SIZE, ChunkCoord, TileCoord, Viewport};
pub use enums::{BuildingType, ItemCategory, RejectionReason, TerrainToolClass, TerrainType};
pub use ids::{ItemId, LivestockId};
pub use level::CivilizationLevel;
pub use terrain::TerrainAttributes;
