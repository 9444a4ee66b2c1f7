//! Buildings: blueprint table and placement.
//!
//! Buildings have no growth state. Once placed they never change; they
//! exist to be counted by progression (a Temple unlocks the ending).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use homestead_economy::defaults::ids;
use homestead_economy::{CommandError, Inventory};
use homestead_types::{BuildingType, CivilizationLevel, ItemId, TileCoord};

use crate::world_grid::WorldGrid;

// ---------------------------------------------------------------------------
// Blueprints
// ---------------------------------------------------------------------------

/// Static cost and unlock level of a building type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingBlueprint {
    /// The building type described.
    pub building_type: BuildingType,
    /// Materials consumed on placement.
    pub material_costs: BTreeMap<ItemId, u32>,
    /// Level at which the building can be placed.
    pub required_level: CivilizationLevel,
}

fn level(raw: u8) -> CivilizationLevel {
    CivilizationLevel::new(raw).unwrap_or_default()
}

/// Look up the blueprint for a building type.
pub fn blueprint(building_type: BuildingType) -> BuildingBlueprint {
    let (material_costs, required_level) = match building_type {
        BuildingType::House => (BTreeMap::from([(ids::WOOD, 10), (ids::STONE, 5)]), level(1)),
        BuildingType::Granary => (BTreeMap::from([(ids::WOOD, 15), (ids::STONE, 10)]), level(2)),
        BuildingType::Workshop => (
            BTreeMap::from([(ids::WOOD, 10), (ids::STONE, 10), (ids::BRICK, 4)]),
            level(2),
        ),
        BuildingType::Barn => (BTreeMap::from([(ids::WOOD, 20), (ids::STONE, 5)]), level(3)),
        BuildingType::Temple => (
            BTreeMap::from([(ids::WOOD, 10), (ids::STONE, 20), (ids::BRICK, 10)]),
            level(4),
        ),
    };
    BuildingBlueprint {
        building_type,
        material_costs,
        required_level,
    }
}

// ---------------------------------------------------------------------------
// Building / BuildingRegistry
// ---------------------------------------------------------------------------

/// A placed building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// The building's tile.
    pub coord: TileCoord,
    /// What was built.
    pub building_type: BuildingType,
}

/// Registry of placed buildings keyed by tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildingRegistry {
    buildings: BTreeMap<TileCoord, Building>,
}

impl BuildingRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            buildings: BTreeMap::new(),
        }
    }

    /// Rebuild a registry from persisted buildings.
    pub fn from_buildings(buildings: impl IntoIterator<Item = Building>) -> Self {
        Self {
            buildings: buildings.into_iter().map(|b| (b.coord, b)).collect(),
        }
    }

    /// Place a building at `coord`, consuming its materials atomically.
    ///
    /// # Errors
    ///
    /// - [`CommandError::InvalidState`] if a building already stands there
    /// - [`CommandError::InvalidTerrain`] unless the tile is generated and
    ///   buildable (barren or stone)
    /// - [`CommandError::NotUnlocked`] if the blueprint level is above `level`
    /// - [`CommandError::InsufficientResource`] if materials are short; the
    ///   inventory is untouched in that case
    pub fn build(
        &mut self,
        grid: &WorldGrid,
        inventory: &mut Inventory,
        coord: TileCoord,
        building_type: BuildingType,
        level: CivilizationLevel,
    ) -> Result<(), CommandError> {
        if self.buildings.contains_key(&coord) {
            return Err(CommandError::invalid_state(format!(
                "a building already stands at {coord}"
            )));
        }
        let terrain = grid.terrain_at(coord);
        if !terrain.is_some_and(|t| t.attributes().buildable) {
            return Err(CommandError::InvalidTerrain { coord, terrain });
        }
        let plan = blueprint(building_type);
        if !level.is_item_available(plan.required_level) {
            return Err(CommandError::NotUnlocked {
                required: plan.required_level,
                current: level,
            });
        }

        inventory.exchange(&plan.material_costs, &[])?;
        self.buildings.insert(
            coord,
            Building {
                coord,
                building_type,
            },
        );
        debug!(%coord, ?building_type, "Placed building");
        Ok(())
    }

    /// Look up a building.
    pub fn building(&self, coord: TileCoord) -> Option<&Building> {
        self.buildings.get(&coord)
    }

    /// Whether a building stands at `coord`.
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.buildings.contains_key(&coord)
    }

    /// Number of buildings of one type.
    pub fn count_by_type(&self, building_type: BuildingType) -> usize {
        self.buildings
            .values()
            .filter(|b| b.building_type == building_type)
            .count()
    }

    /// Every building in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    /// Number of buildings.
    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    /// Whether nothing has been built.
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
