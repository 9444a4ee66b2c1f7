//! The simulation: one owner for all mutable world state.
//!
//! [`Simulation`] holds the grid, the ledger, every production registry,
//! and the progression gate. It is driven by [`Simulation::step`], which
//! runs the fixed per-frame order
//!
//! 1. generate chunks around the viewport,
//! 2. advance farm plots and livestock pens,
//! 3. evaluate the pending civilization transition,
//!
//! and it exposes a synchronous command surface (plant, harvest, place,
//! convert, build, craft) plus a read-only query surface. Nothing here is
//! shared across threads; a presentation layer on another thread should
//! read a [`WorldSnapshot`](crate::snapshot::WorldSnapshot) instead of the
//! live state.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use homestead_economy::{
    Catalog, CommandError, CraftOutcome, CraftingSystem, Inventory, ItemData, PreservedFoodStore,
};
use homestead_types::{
    BuildingType, CivilizationLevel, ItemId, LivestockId, TileCoord, Viewport,
};
use homestead_world::{
    Building, BuildingRegistry, ConversionOutcome, FarmPlot, FarmRegistry, LivestockPen,
    PenRegistry, TerrainConversionEngine, TerrainTile, WorldGrid,
};

use crate::clock::SimClock;
use crate::config::SimulationConfig;
use crate::progression::{ProgressionAggregates, ProgressionGate, Requirement};

/// Mixing constant for the species draw seed.
const DRAW_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

// ---------------------------------------------------------------------------
// StepSummary
// ---------------------------------------------------------------------------

/// What happened during one [`Simulation::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepSummary {
    /// Step number after this step.
    pub step: u64,
    /// Chunks generated around the viewport.
    pub chunks_generated: usize,
    /// Plots that became harvestable.
    pub plots_ripened: usize,
    /// Pens whose product slot was filled.
    pub pens_produced: usize,
    /// New level, if the civilization advanced.
    pub level_up: Option<CivilizationLevel>,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// The complete simulation state and its command surface.
#[derive(Debug)]
pub struct Simulation {
    pub(crate) config: SimulationConfig,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) clock: SimClock,
    pub(crate) grid: WorldGrid,
    pub(crate) conversion: TerrainConversionEngine,
    pub(crate) crafting: CraftingSystem,
    pub(crate) inventory: Inventory,
    pub(crate) preserved: PreservedFoodStore,
    pub(crate) farms: FarmRegistry,
    pub(crate) pens: PenRegistry,
    pub(crate) buildings: BuildingRegistry,
    pub(crate) progression: ProgressionGate,
    pub(crate) player_position: TileCoord,
    pub(crate) lifetime_products: u64,
    pub(crate) species_draws: u64,
}

impl Simulation {
    /// Create a fresh world from configuration and a loaded catalog.
    ///
    /// No terrain exists until the first [`step`](Self::step).
    pub fn new(config: SimulationConfig, catalog: Arc<Catalog>) -> Self {
        let grid = WorldGrid::new(config.generator_settings(), config.world.view_margin_chunks);
        let inventory = Inventory::from_map(config.player.starting_inventory.clone());
        let farms = FarmRegistry::new(config.production.crop_stage_seconds);
        let pens = PenRegistry::new(
            Arc::clone(&catalog),
            config.production.livestock_stage_seconds,
        );
        let progression = ProgressionGate::new(config.progression);
        let player_position = config.player.start_position;

        Self {
            conversion: TerrainConversionEngine::new(
                Arc::clone(&catalog),
                config.conversion.water_search_radius,
            ),
            crafting: CraftingSystem::new(Arc::clone(&catalog)),
            config,
            catalog,
            clock: SimClock::new(),
            grid,
            inventory,
            preserved: PreservedFoodStore::new(),
            farms,
            pens,
            buildings: BuildingRegistry::new(),
            progression,
            player_position,
            lifetime_products: 0,
            species_draws: 0,
        }
    }

    /// Advance the world by `dt` seconds with `viewport` visible.
    ///
    /// Negative or non-finite `dt` is treated as zero; generation and the
    /// progression check still run.
    pub fn step(&mut self, dt: f32, viewport: Viewport) -> StepSummary {
        let dt = SimClock::sanitize_dt(dt);
        let step = self.clock.advance(dt).unwrap_or_else(|e| {
            warn!(error = %e, "clock saturated");
            self.clock.step()
        });

        let chunks_generated = self.grid.generate_in_view(viewport);
        let plots_ripened = self.farms.update(dt);
        let pens_produced = self.pens.update(dt);
        let level_up = self.progression.check_progress(&self.aggregates());

        StepSummary {
            step,
            chunks_generated,
            plots_ripened,
            pens_produced,
            level_up,
        }
    }

    /// The viewport of `radius` tiles around the player.
    pub const fn player_viewport(&self, radius: i32) -> Viewport {
        Viewport::around(self.player_position, radius)
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Plant a seed on crop-bearing terrain.
    ///
    /// # Errors
    ///
    /// [`CommandError::InvalidState`] if a pen or building occupies the
    /// tile, [`CommandError::InvalidTerrain`] unless the terrain supports
    /// crops, then any error of [`FarmRegistry::plant`].
    pub fn plant_seed(&mut self, coord: TileCoord) -> Result<(), CommandError> {
        self.ensure_unoccupied(coord, Occupant::Plot)?;
        self.ensure_terrain(coord, |t| t.attributes().supports_crops)?;
        let seed_item = self.config.production.seed_item;
        let result = self.farms.plant(coord, &mut self.inventory, seed_item);
        log_outcome("plant_seed", coord, result)
    }

    /// Harvest a ripe plot.
    ///
    /// # Errors
    ///
    /// See [`FarmRegistry::harvest`].
    pub fn harvest(&mut self, coord: TileCoord) -> Result<u32, CommandError> {
        let crop_item = self.config.production.crop_item;
        let result = self.farms.harvest(coord, &mut self.inventory, crop_item);
        log_outcome("harvest", coord, result)
    }

    /// Place an animal. Without an explicit species, one is drawn
    /// uniformly among the species unlocked at the current level.
    ///
    /// # Errors
    ///
    /// - [`CommandError::InvalidState`] if the tile is occupied, the species
    ///   is unknown, or no species is unlocked
    /// - [`CommandError::InvalidTerrain`] unless the terrain supports
    ///   livestock
    /// - [`CommandError::NotUnlocked`] for a locked explicit species
    /// - [`CommandError::InsufficientResource`] without feed
    pub fn place_animal(
        &mut self,
        coord: TileCoord,
        species: Option<LivestockId>,
    ) -> Result<LivestockId, CommandError> {
        self.ensure_unoccupied(coord, Occupant::Pen)?;
        self.ensure_terrain(coord, |t| t.attributes().supports_livestock)?;
        let feed_item = self.config.production.feed_item;
        if !self.inventory.has(feed_item, 1) {
            return Err(CommandError::InsufficientResource {
                item: feed_item,
                requested: 1,
                available: 0,
            });
        }

        let level = self.progression.level();
        let chosen = match species {
            Some(id) => {
                let data = self
                    .catalog
                    .species(id)
                    .ok_or_else(|| CommandError::invalid_state(format!("unknown species {id}")))?;
                if !level.is_item_available(data.required_level) {
                    return Err(CommandError::NotUnlocked {
                        required: data.required_level,
                        current: level,
                    });
                }
                id
            }
            None => self.draw_species(level)?,
        };

        let result = self
            .pens
            .place_animal(coord, chosen, &mut self.inventory, feed_item)
            .map(|()| chosen);
        if result.is_ok() && species.is_none() {
            self.species_draws = self.species_draws.saturating_add(1);
        }
        log_outcome("place_animal", coord, result)
    }

    /// Collect a waiting livestock product.
    ///
    /// # Errors
    ///
    /// See [`PenRegistry::harvest_product`].
    pub fn harvest_product(&mut self, coord: TileCoord) -> Result<ItemId, CommandError> {
        let result = self.pens.harvest_product(coord, &mut self.inventory);
        if result.is_ok() {
            self.lifetime_products = self.lifetime_products.saturating_add(1);
        }
        log_outcome("harvest_product", coord, result)
    }

    /// Slaughter an animal for its meat.
    ///
    /// # Errors
    ///
    /// See [`PenRegistry::kill_animal`].
    pub fn kill_animal(&mut self, coord: TileCoord) -> Result<ItemId, CommandError> {
        let result = self.pens.kill_animal(coord, &mut self.inventory);
        log_outcome("kill_animal", coord, result)
    }

    /// Apply a terrain tool to a tile.
    ///
    /// # Errors
    ///
    /// [`CommandError::InvalidState`] if a pen or building stands on the
    /// tile, then any error of [`TerrainConversionEngine::try_convert`].
    pub fn try_convert_terrain(
        &mut self,
        coord: TileCoord,
        tool: ItemId,
    ) -> Result<ConversionOutcome, CommandError> {
        if self.pens.contains(coord) || self.buildings.contains(coord) {
            return Err(CommandError::invalid_state(format!(
                "tile {coord} is occupied"
            )));
        }
        let level = self.progression.level();
        let result =
            self.conversion
                .try_convert(&mut self.grid, &mut self.inventory, coord, tool, level);
        log_outcome("convert_terrain", coord, result)
    }

    /// Place a building.
    ///
    /// # Errors
    ///
    /// [`CommandError::InvalidState`] if a plot or pen occupies the tile,
    /// then any error of [`BuildingRegistry::build`].
    pub fn build(
        &mut self,
        coord: TileCoord,
        building_type: BuildingType,
    ) -> Result<(), CommandError> {
        self.ensure_unoccupied(coord, Occupant::Building)?;
        let level = self.progression.level();
        let result =
            self.buildings
                .build(&self.grid, &mut self.inventory, coord, building_type, level);
        log_outcome("build", coord, result)
    }

    /// Craft one batch of an item.
    ///
    /// # Errors
    ///
    /// See [`CraftingSystem::craft`].
    pub fn craft(&mut self, item: ItemId) -> Result<CraftOutcome, CommandError> {
        let level = self.progression.level();
        let result = self
            .crafting
            .craft(&mut self.inventory, &mut self.preserved, item, level);
        match &result {
            Ok(_) => debug!(item = %item, "craft succeeded"),
            Err(e) => debug!(item = %item, error = %e, "craft rejected"),
        }
        result
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Look up a generated tile.
    pub fn tile(&self, coord: TileCoord) -> Option<&TerrainTile> {
        self.grid.get_tile(coord)
    }

    /// Look up a farm plot.
    pub fn plot(&self, coord: TileCoord) -> Option<&FarmPlot> {
        self.farms.plot(coord)
    }

    /// Look up a livestock pen.
    pub fn pen(&self, coord: TileCoord) -> Option<&LivestockPen> {
        self.pens.pen(coord)
    }

    /// Look up a building.
    pub fn building(&self, coord: TileCoord) -> Option<&Building> {
        self.buildings.building(coord)
    }

    /// The player's inventory.
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Preserved food routed out of crafting.
    pub const fn preserved_food(&self) -> &PreservedFoodStore {
        &self.preserved
    }

    /// The terrain grid.
    pub const fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    /// The farm plot registry.
    pub const fn farms(&self) -> &FarmRegistry {
        &self.farms
    }

    /// The livestock pen registry.
    pub const fn pens(&self) -> &PenRegistry {
        &self.pens
    }

    /// The building registry.
    pub const fn buildings(&self) -> &BuildingRegistry {
        &self.buildings
    }

    /// The shared catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The configuration this world runs with.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The simulation clock.
    pub const fn clock(&self) -> SimClock {
        self.clock
    }

    /// Current civilization level.
    pub const fn civilization_level(&self) -> CivilizationLevel {
        self.progression.level()
    }

    /// Display name of the current level.
    pub fn civilization_name(&self) -> &'static str {
        self.progression.level_name()
    }

    /// What the pending level transition needs, if any.
    pub const fn next_requirement(&self) -> Option<Requirement> {
        self.progression.next_requirement()
    }

    /// Whether the ending can be offered.
    pub fn is_ending_available(&self) -> bool {
        self.progression.is_ending_available(&self.aggregates())
    }

    /// Livestock products collected over the world's lifetime.
    pub const fn lifetime_products(&self) -> u64 {
        self.lifetime_products
    }

    /// Counters feeding the progression gate.
    pub fn aggregates(&self) -> ProgressionAggregates {
        ProgressionAggregates::collect(
            &self.preserved,
            self.lifetime_products,
            self.buildings.count_by_type(BuildingType::Temple),
        )
    }

    /// Recipes unlocked at the current level.
    pub fn available_recipes(&self) -> Vec<&ItemData> {
        self.crafting.available_recipes(self.progression.level())
    }

    /// Whether the current inventory covers a recipe.
    pub fn can_craft(&self, item: ItemId) -> bool {
        self.crafting.can_craft(&self.inventory, item)
    }

    /// The player's tile.
    pub const fn player_position(&self) -> TileCoord {
        self.player_position
    }

    /// Move the player.
    pub const fn set_player_position(&mut self, coord: TileCoord) {
        self.player_position = coord;
    }

    /// The best held tool for the tile's current terrain.
    pub fn find_usable_tool(&self, coord: TileCoord) -> Option<ItemId> {
        self.conversion.find_usable_tool(
            &self.grid,
            &self.inventory,
            coord,
            self.progression.level(),
        )
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn ensure_unoccupied(&self, coord: TileCoord, placing: Occupant) -> Result<(), CommandError> {
        let blocker = if placing != Occupant::Plot && self.farms.contains(coord) {
            Some("farm plot")
        } else if placing != Occupant::Pen && self.pens.contains(coord) {
            Some("livestock pen")
        } else if placing != Occupant::Building && self.buildings.contains(coord) {
            Some("building")
        } else {
            None
        };
        blocker.map_or(Ok(()), |what| {
            Err(CommandError::invalid_state(format!(
                "a {what} already occupies {coord}"
            )))
        })
    }

    fn ensure_terrain(
        &self,
        coord: TileCoord,
        allowed: impl Fn(homestead_types::TerrainType) -> bool,
    ) -> Result<(), CommandError> {
        let terrain = self.grid.terrain_at(coord);
        if terrain.is_some_and(allowed) {
            Ok(())
        } else {
            Err(CommandError::InvalidTerrain { coord, terrain })
        }
    }

    fn draw_species(&self, level: CivilizationLevel) -> Result<LivestockId, CommandError> {
        let available: Vec<LivestockId> = self
            .catalog
            .species_available(level)
            .into_iter()
            .map(|s| s.id)
            .collect();
        let seed = self.config.world.seed ^ self.species_draws.wrapping_mul(DRAW_MIX);
        let mut rng = StdRng::seed_from_u64(seed);
        available
            .choose(&mut rng)
            .copied()
            .ok_or_else(|| CommandError::invalid_state("no species unlocked"))
    }
}

fn log_outcome<T>(
    command: &'static str,
    coord: TileCoord,
    result: Result<T, CommandError>,
) -> Result<T, CommandError> {
    match &result {
        Ok(_) => debug!(command, %coord, "command succeeded"),
        Err(e) => debug!(command, %coord, reason = ?e.reason(), error = %e, "command rejected"),
    }
    result
}

/// Kind of production entity being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occupant {
    Plot,
    Pen,
    Building,
}
