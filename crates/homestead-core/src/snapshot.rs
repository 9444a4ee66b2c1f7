//! Persistence snapshots.
//!
//! A [`WorldSnapshot`] is an owned, serializable copy of everything needed
//! to rebuild a [`Simulation`]. Terrain is not stored tile by tile: the
//! generated-chunk set is replayed through the deterministic generator and
//! only tiles that differ from generator output are recorded as overrides.
//!
//! Every map is stored as a list of records so the snapshot can be written
//! in any serde format, including ones without non-string map keys.
//!
//! The generator's noise parameters travel with the seed: replaying the
//! chunk list under different noise would rebuild a different world under
//! the recorded overrides.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use homestead_economy::{Catalog, CommandError, Inventory, PreservedFoodStore};
use homestead_types::{ChunkCoord, CivilizationLevel, ItemId, LivestockId, TerrainType, TileCoord};
use homestead_world::{
    Building, BuildingRegistry, FarmPlot, FarmRegistry, HARVESTABLE_STAGE, LivestockPen,
    MATURE_STAGE, PenRegistry,
};

use crate::clock::SimClock;
use crate::config::SimulationConfig;
use crate::progression::ProgressionGate;
use crate::simulation::Simulation;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 2;

/// Errors that can occur while saving or restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot was written by an incompatible format version.
    #[error("unsupported snapshot version {found} (expected {SNAPSHOT_VERSION})")]
    UnsupportedVersion {
        /// Version found in the snapshot.
        found: u32,
    },

    /// A pen references a species missing from the catalog.
    #[error("snapshot references unknown species {0}")]
    UnknownSpecies(LivestockId),

    /// A terrain override could not be applied, usually because its tile
    /// lies outside every recorded chunk.
    #[error("terrain override at {coord} cannot be applied: {source}")]
    InvalidOverride {
        /// The offending tile.
        coord: TileCoord,
        /// Why the grid refused it.
        #[source]
        source: CommandError,
    },

    /// A plot, pen, or building is out of range or shares its tile with
    /// another one.
    #[error("invalid entity at {coord}: {reason}")]
    InvalidEntity {
        /// The offending tile.
        coord: TileCoord,
        /// What is wrong with it.
        reason: String,
    },

    /// Failed to encode or decode JSON. Out-of-range levels surface here.
    #[error("snapshot JSON error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// Failed to read or write the snapshot file.
    #[error("snapshot I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One item quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item.
    pub item: ItemId,
    /// Quantity held.
    pub quantity: u32,
}

/// A tile whose terrain differs from generator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainOverride {
    /// The tile.
    pub coord: TileCoord,
    /// Its current terrain.
    pub terrain: TerrainType,
}

/// Owned copy of a simulation's persistent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Format version.
    pub version: u32,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Seed of the terrain generator.
    pub world_seed: u64,
    /// fBm octaves of the terrain noise.
    pub noise_octaves: i32,
    /// Base frequency of the terrain noise.
    pub noise_frequency: f32,
    /// Simulation clock.
    pub clock: SimClock,
    /// Player tile.
    pub player_position: TileCoord,
    /// Inventory contents.
    pub inventory: Vec<ItemStack>,
    /// Farm plots.
    pub plots: Vec<FarmPlot>,
    /// Occupied pens.
    pub pens: Vec<LivestockPen>,
    /// Placed buildings.
    pub buildings: Vec<Building>,
    /// Every generated chunk.
    pub generated_chunks: Vec<ChunkCoord>,
    /// Tiles changed since generation.
    pub terrain_overrides: Vec<TerrainOverride>,
    /// Civilization level.
    pub civilization_level: CivilizationLevel,
    /// Preserved-food store contents.
    pub preserved_food: Vec<ItemStack>,
    /// Livestock products collected over the world's lifetime.
    pub lifetime_products: u64,
    /// Number of random species draws made so far.
    pub species_draws: u64,
}

impl WorldSnapshot {
    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] for malformed JSON or field values
    /// out of range.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write as pretty JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] or [`SnapshotError::Io`].
    pub fn write_to(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read from a JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] or [`SnapshotError::Json`].
    pub fn read_from(path: &Path) -> Result<Self, SnapshotError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

fn stacks(items: impl Iterator<Item = (ItemId, u32)>) -> Vec<ItemStack> {
    items
        .map(|(item, quantity)| ItemStack { item, quantity })
        .collect()
}

// ---------------------------------------------------------------------------
// Save / restore
// ---------------------------------------------------------------------------

impl Simulation {
    /// Take an owned snapshot of the persistent state.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            world_seed: self.config.world.seed,
            noise_octaves: self.config.world.noise_octaves,
            noise_frequency: self.config.world.noise_frequency,
            clock: self.clock,
            player_position: self.player_position,
            inventory: stacks(self.inventory.iter()),
            plots: self.farms.iter().copied().collect(),
            pens: self.pens.iter().copied().collect(),
            buildings: self.buildings.iter().copied().collect(),
            generated_chunks: self.grid.generated_chunks().collect(),
            terrain_overrides: self
                .grid
                .terrain_overrides()
                .into_iter()
                .map(|(coord, terrain)| TerrainOverride { coord, terrain })
                .collect(),
            civilization_level: self.progression.level(),
            preserved_food: stacks(self.preserved.snapshot().into_iter()),
            lifetime_products: self.lifetime_products,
            species_draws: self.species_draws,
        }
    }

    /// Rebuild a simulation from a snapshot.
    ///
    /// The snapshot's seed and noise parameters replace those in `config`,
    /// recorded chunks are regenerated, and overrides are applied on top.
    ///
    /// # Errors
    ///
    /// - [`SnapshotError::UnsupportedVersion`] for a foreign format
    /// - [`SnapshotError::InvalidEntity`] for a stage out of range or two
    ///   entities on one tile
    /// - [`SnapshotError::UnknownSpecies`] if a pen's species is missing
    /// - [`SnapshotError::InvalidOverride`] for an override on an
    ///   unrecorded chunk
    pub fn restore(
        snapshot: WorldSnapshot,
        mut config: SimulationConfig,
        catalog: Arc<Catalog>,
    ) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
            });
        }
        check_entities(&snapshot)?;

        let world = &mut config.world;
        if world.noise_octaves != snapshot.noise_octaves
            || world.noise_frequency.to_bits() != snapshot.noise_frequency.to_bits()
        {
            info!(
                octaves = snapshot.noise_octaves,
                frequency = snapshot.noise_frequency,
                "Using the snapshot's noise settings over the configured ones"
            );
        }
        world.seed = snapshot.world_seed;
        world.noise_octaves = snapshot.noise_octaves;
        world.noise_frequency = snapshot.noise_frequency;

        let pens = PenRegistry::from_pens(
            Arc::clone(&catalog),
            snapshot.pens,
            config.production.livestock_stage_seconds,
        )
        .map_err(SnapshotError::UnknownSpecies)?;

        let mut sim = Self::new(config, catalog);
        for chunk in snapshot.generated_chunks {
            sim.grid.generate_chunk(chunk);
        }
        for TerrainOverride { coord, terrain } in snapshot.terrain_overrides {
            sim.grid
                .set_terrain_type(coord, terrain)
                .map_err(|source| SnapshotError::InvalidOverride { coord, source })?;
        }

        sim.clock = snapshot.clock;
        sim.player_position = snapshot.player_position;
        sim.inventory = Inventory::from_map(
            snapshot
                .inventory
                .into_iter()
                .map(|s| (s.item, s.quantity))
                .collect(),
        );
        sim.preserved = PreservedFoodStore::from_map(
            snapshot
                .preserved_food
                .into_iter()
                .map(|s| (s.item, s.quantity))
                .collect(),
        );
        sim.farms = FarmRegistry::from_plots(
            snapshot.plots,
            sim.config.production.crop_stage_seconds,
        );
        sim.pens = pens;
        sim.buildings = BuildingRegistry::from_buildings(snapshot.buildings);
        sim.progression =
            ProgressionGate::at_level(snapshot.civilization_level, sim.config.progression);
        sim.lifetime_products = snapshot.lifetime_products;
        sim.species_draws = snapshot.species_draws;

        info!(
            step = sim.clock.step(),
            chunks = sim.grid.generated_chunk_count(),
            level = %sim.progression.level(),
            "Restored simulation from snapshot"
        );
        Ok(sim)
    }
}

/// Reject stages past their last value and tiles claimed twice.
fn check_entities(snapshot: &WorldSnapshot) -> Result<(), SnapshotError> {
    let invalid = |coord, reason: String| SnapshotError::InvalidEntity { coord, reason };
    let mut occupied = BTreeSet::new();

    for plot in &snapshot.plots {
        if plot.growth_stage > HARVESTABLE_STAGE {
            return Err(invalid(
                plot.coord,
                format!("crop stage {} exceeds {HARVESTABLE_STAGE}", plot.growth_stage),
            ));
        }
        if !occupied.insert(plot.coord) {
            return Err(invalid(plot.coord, "duplicate farm plot".to_owned()));
        }
    }
    for pen in &snapshot.pens {
        if pen.growth_stage > MATURE_STAGE {
            return Err(invalid(
                pen.coord,
                format!("animal stage {} exceeds {MATURE_STAGE}", pen.growth_stage),
            ));
        }
        if !occupied.insert(pen.coord) {
            return Err(invalid(pen.coord, "pen shares its tile".to_owned()));
        }
    }
    for building in &snapshot.buildings {
        if !occupied.insert(building.coord) {
            return Err(invalid(building.coord, "building shares its tile".to_owned()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use homestead_economy::builtin_catalog;

    fn sim() -> Simulation {
        let mut s = Simulation::new(SimulationConfig::default(), Arc::new(builtin_catalog()));
        let view = s.player_viewport(4);
        let _ = s.step(0.5, view);
        s
    }

    #[test]
    fn json_round_trip_preserves_state() {
        let original = sim().snapshot();
        let json = original.to_json_pretty().unwrap_or_default();
        let decoded = WorldSnapshot::from_json(&json);
        assert!(decoded.is_ok());
        assert_eq!(decoded.ok(), Some(original));
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        let mut value = serde_json::to_value(sim().snapshot()).unwrap_or_default();
        value["civilization_level"] = serde_json::json!(11);
        let json = value.to_string();
        assert!(matches!(
            WorldSnapshot::from_json(&json),
            Err(SnapshotError::Json { .. })
        ));
    }

    #[test]
    fn unknown_species_is_rejected() {
        let mut snapshot = sim().snapshot();
        snapshot.pens.push(LivestockPen::new(TileCoord::new(0, 0), LivestockId::new(404)));
        let restored = Simulation::restore(
            snapshot,
            SimulationConfig::default(),
            Arc::new(builtin_catalog()),
        );
        assert!(matches!(restored, Err(SnapshotError::UnknownSpecies(_))));
    }

    #[test]
    fn foreign_version_is_rejected() {
        let mut snapshot = sim().snapshot();
        snapshot.version = 99;
        let restored = Simulation::restore(
            snapshot,
            SimulationConfig::default(),
            Arc::new(builtin_catalog()),
        );
        assert!(matches!(
            restored,
            Err(SnapshotError::UnsupportedVersion { found: 99 })
        ));
    }

    fn restored(snapshot: WorldSnapshot) -> Result<Simulation, SnapshotError> {
        Simulation::restore(snapshot, SimulationConfig::default(), Arc::new(builtin_catalog()))
    }

    #[test]
    fn stages_past_the_last_are_rejected() {
        let at = TileCoord::new(1, 1);
        let mut snapshot = sim().snapshot();
        let mut plot = FarmPlot::empty(at);
        plot.has_seed = true;
        plot.growth_stage = 4;
        snapshot.plots.push(plot);
        assert!(matches!(
            restored(snapshot),
            Err(SnapshotError::InvalidEntity { coord, .. }) if coord == at
        ));

        let mut snapshot = sim().snapshot();
        let mut pen = LivestockPen::new(at, homestead_economy::defaults::ids::CHICKEN);
        pen.growth_stage = 3;
        snapshot.pens.push(pen);
        assert!(matches!(
            restored(snapshot),
            Err(SnapshotError::InvalidEntity { .. })
        ));
    }

    #[test]
    fn shared_tiles_are_rejected() {
        let at = TileCoord::new(2, 2);
        let mut snapshot = sim().snapshot();
        snapshot.plots.push(FarmPlot::empty(at));
        snapshot
            .pens
            .push(LivestockPen::new(at, homestead_economy::defaults::ids::PIG));
        assert!(matches!(
            restored(snapshot),
            Err(SnapshotError::InvalidEntity { coord, .. }) if coord == at
        ));

        let mut snapshot = sim().snapshot();
        snapshot.plots.push(FarmPlot::empty(at));
        snapshot.plots.push(FarmPlot::empty(at));
        assert!(matches!(
            restored(snapshot),
            Err(SnapshotError::InvalidEntity { .. })
        ));
    }

    #[test]
    fn snapshot_noise_settings_win_over_config() {
        let original = sim();
        let snapshot = original.snapshot();
        assert_eq!(snapshot.noise_octaves, 4);

        let mut config = SimulationConfig::default();
        config.world.noise_octaves = 1;
        config.world.noise_frequency = 0.05;
        let restored = Simulation::restore(snapshot, config, Arc::new(builtin_catalog()));
        assert!(restored.is_ok());
        let Ok(restored) = restored else { return };
        assert_eq!(
            restored.config().generator_settings(),
            original.config().generator_settings()
        );
    }

    #[test]
    fn override_outside_grid_is_rejected() {
        let mut snapshot = sim().snapshot();
        snapshot.terrain_overrides.push(TerrainOverride {
            coord: TileCoord::new(50_000, 50_000),
            terrain: TerrainType::Paddy,
        });
        let restored = Simulation::restore(
            snapshot,
            SimulationConfig::default(),
            Arc::new(builtin_catalog()),
        );
        assert!(matches!(
            restored,
            Err(SnapshotError::InvalidOverride { .. })
        ));
    }
}
