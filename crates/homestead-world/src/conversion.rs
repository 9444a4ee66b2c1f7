//! Tool-driven terrain conversion.
//!
//! Terrain changes only along a fixed transition graph:
//!
//! | Tool class        | From                        | To              | Precondition          |
//! |-------------------|-----------------------------|-----------------|-----------------------|
//! | Hoe               | Dirt                        | Farmland        |                       |
//! | Drainage shovel   | Dirt, Grass, `DrainedMarsh` | `WaterChannel`  |                       |
//! | Drainage shovel   | Marsh                       | `DrainedMarsh`  |                       |
//! | Leveler           | `DrainedMarsh`              | Paddy           | water source in range |
//!
//! Stone and water are never convertible, and cultivated land (farmland,
//! paddy) is protected from every tool. Each successful application consumes
//! one unit of the tool item.

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::debug;

use homestead_economy::{Catalog, CommandError, Inventory};
use homestead_types::{CivilizationLevel, ItemId, TerrainToolClass, TerrainType, TileCoord};

use crate::world_grid::WorldGrid;

/// Default Chebyshev radius searched for a water source when levelling a
/// paddy.
pub const DEFAULT_WATER_SEARCH_RADIUS: u32 = 3;

/// Result of a successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// The converted tile.
    pub coord: TileCoord,
    /// The tool item consumed.
    pub tool: ItemId,
    /// Terrain before conversion.
    pub from: TerrainType,
    /// Terrain after conversion.
    pub to: TerrainType,
}

/// Where a tool class can take a terrain type, if anywhere.
///
/// Ignores the never-convertible and protected flags; callers check those
/// first.
pub const fn transition(class: TerrainToolClass, from: TerrainType) -> Option<TerrainType> {
    match (class, from) {
        (TerrainToolClass::Hoe, TerrainType::Dirt) => Some(TerrainType::Farmland),
        (
            TerrainToolClass::DrainageShovel,
            TerrainType::Dirt | TerrainType::Grass | TerrainType::DrainedMarsh,
        ) => Some(TerrainType::WaterChannel),
        (TerrainToolClass::DrainageShovel, TerrainType::Marsh) => Some(TerrainType::DrainedMarsh),
        (TerrainToolClass::Leveler, TerrainType::DrainedMarsh) => Some(TerrainType::Paddy),
        _ => None,
    }
}

/// Whether `class` needs a nearby water source to convert `from`.
const fn needs_water(class: TerrainToolClass, from: TerrainType) -> bool {
    matches!(
        (class, from),
        (TerrainToolClass::Leveler, TerrainType::DrainedMarsh)
    )
}

/// Applies terrain tools to the grid.
#[derive(Debug, Clone)]
pub struct TerrainConversionEngine {
    catalog: Arc<Catalog>,
    water_search_radius: u32,
}

impl TerrainConversionEngine {
    /// Create an engine over a shared catalog.
    pub const fn new(catalog: Arc<Catalog>, water_search_radius: u32) -> Self {
        Self {
            catalog,
            water_search_radius,
        }
    }

    /// Radius searched for water when levelling a paddy.
    pub const fn water_search_radius(&self) -> u32 {
        self.water_search_radius
    }

    /// Convert the tile at `coord` with `tool`.
    ///
    /// Validates, in order: the tool is a held terrain tool, its level is
    /// unlocked, the tile's terrain is eligible for the tool class, and any
    /// adjacency precondition holds. On success one unit of the tool is
    /// removed and the terrain updated.
    ///
    /// # Errors
    ///
    /// - [`CommandError::UnknownItem`], [`CommandError::NotATerrainTool`],
    ///   [`CommandError::InsufficientResource`] for tool problems
    /// - [`CommandError::NotUnlocked`] for a locked tool
    /// - [`CommandError::InvalidTerrain`] for an ineligible or ungenerated tile
    /// - [`CommandError::AdjacencyUnmet`] when no water source is in range
    pub fn try_convert(
        &self,
        grid: &mut WorldGrid,
        inventory: &mut Inventory,
        coord: TileCoord,
        tool: ItemId,
        level: CivilizationLevel,
    ) -> Result<ConversionOutcome, CommandError> {
        let data = self
            .catalog
            .item(tool)
            .ok_or(CommandError::UnknownItem(tool))?;
        let class = data.tool_class.ok_or(CommandError::NotATerrainTool(tool))?;
        if !inventory.has(tool, 1) {
            return Err(CommandError::InsufficientResource {
                item: tool,
                requested: 1,
                available: inventory.count(tool),
            });
        }
        if !level.is_item_available(data.required_level) {
            return Err(CommandError::NotUnlocked {
                required: data.required_level,
                current: level,
            });
        }

        let from = grid.terrain_at(coord).ok_or(CommandError::InvalidTerrain {
            coord,
            terrain: None,
        })?;
        let attributes = from.attributes();
        let invalid = CommandError::InvalidTerrain {
            coord,
            terrain: Some(from),
        };
        if attributes.never_convertible || attributes.protected_from_conversion {
            return Err(invalid);
        }
        let to = transition(class, from).ok_or(invalid)?;

        if needs_water(class, from) && !grid.has_water_within(coord, self.water_search_radius) {
            return Err(CommandError::AdjacencyUnmet {
                coord,
                radius: self.water_search_radius,
            });
        }

        inventory.remove(tool, 1)?;
        grid.set_terrain_type(coord, to)?;

        debug!(%coord, tool = %tool, ?from, ?to, "Converted terrain");
        Ok(ConversionOutcome {
            coord,
            tool,
            from,
            to,
        })
    }

    /// The best held tool that can convert the tile's current terrain.
    ///
    /// Prefers the highest tier; ties go to the lowest item id. Tools locked
    /// at `level` are ignored. Returns `None` for ungenerated, protected, or
    /// never-convertible tiles.
    pub fn find_usable_tool(
        &self,
        grid: &WorldGrid,
        inventory: &Inventory,
        coord: TileCoord,
        level: CivilizationLevel,
    ) -> Option<ItemId> {
        let from = grid.terrain_at(coord)?;
        let attributes = from.attributes();
        if attributes.never_convertible || attributes.protected_from_conversion {
            return None;
        }
        self.catalog
            .items()
            .filter(|item| {
                item.tool_class
                    .is_some_and(|class| transition(class, from).is_some())
            })
            .filter(|item| inventory.has(item.id, 1))
            .filter(|item| level.is_item_available(item.required_level))
            .max_by_key(|item| (item.tier, Reverse(item.id)))
            .map(|item| item.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorSettings;
    use homestead_economy::builtin_catalog;
    use homestead_economy::defaults::ids;
    use homestead_types::ChunkCoord;

    fn level(raw: u8) -> CivilizationLevel {
        CivilizationLevel::new(raw).unwrap_or_default()
    }

    /// A generated chunk flattened to grass so tests control every tile.
    fn flat_grid() -> WorldGrid {
        let mut grid = WorldGrid::new(GeneratorSettings::default(), 0);
        grid.generate_chunk(ChunkCoord::new(0, 0));
        for coord in ChunkCoord::new(0, 0).tiles() {
            let _ = grid.set_terrain_type(coord, TerrainType::Grass);
        }
        grid
    }

    fn engine() -> TerrainConversionEngine {
        TerrainConversionEngine::new(Arc::new(builtin_catalog()), DEFAULT_WATER_SEARCH_RADIUS)
    }

    fn with_tool(tool: ItemId, amount: u32) -> Inventory {
        let mut inv = Inventory::new();
        let _ = inv.add(tool, amount);
        inv
    }

    #[test]
    fn hoe_tills_dirt_and_consumes_tool() {
        let mut grid = flat_grid();
        let coord = TileCoord::new(4, 4);
        let _ = grid.set_terrain_type(coord, TerrainType::Dirt);
        let mut inv = with_tool(ids::STONE_HOE, 1);

        let outcome = engine().try_convert(&mut grid, &mut inv, coord, ids::STONE_HOE, level(1));
        assert_eq!(outcome.map(|o| o.to), Ok(TerrainType::Farmland));
        assert_eq!(grid.terrain_at(coord), Some(TerrainType::Farmland));
        assert_eq!(inv.count(ids::STONE_HOE), 0);
    }

    #[test]
    fn wrong_source_is_invalid_terrain_and_keeps_tool() {
        let mut grid = flat_grid();
        let coord = TileCoord::new(4, 4);
        let mut inv = with_tool(ids::STONE_HOE, 1);
        let result = engine().try_convert(&mut grid, &mut inv, coord, ids::STONE_HOE, level(1));
        assert!(matches!(result, Err(CommandError::InvalidTerrain { .. })));
        assert_eq!(inv.count(ids::STONE_HOE), 1);
        assert_eq!(grid.terrain_at(coord), Some(TerrainType::Grass));
    }

    #[test]
    fn protected_and_fixed_terrain_reject_every_tool() {
        let mut grid = flat_grid();
        let eng = engine();
        for terrain in [
            TerrainType::Farmland,
            TerrainType::Paddy,
            TerrainType::Stone,
            TerrainType::Water,
        ] {
            let coord = TileCoord::new(6, 6);
            let _ = grid.set_terrain_type(coord, terrain);
            let mut inv = with_tool(ids::DRAINAGE_SHOVEL, 1);
            let result = eng.try_convert(&mut grid, &mut inv, coord, ids::DRAINAGE_SHOVEL, level(1));
            assert!(matches!(result, Err(CommandError::InvalidTerrain { .. })));
            assert_eq!(grid.terrain_at(coord), Some(terrain));
        }
    }

    #[test]
    fn shovel_drains_marsh() {
        let mut grid = flat_grid();
        let coord = TileCoord::new(3, 9);
        let _ = grid.set_terrain_type(coord, TerrainType::Marsh);
        let mut inv = with_tool(ids::DRAINAGE_SHOVEL, 2);
        let eng = engine();

        assert!(eng.try_convert(&mut grid, &mut inv, coord, ids::DRAINAGE_SHOVEL, level(1)).is_ok());
        assert_eq!(grid.terrain_at(coord), Some(TerrainType::DrainedMarsh));
        assert!(eng.try_convert(&mut grid, &mut inv, coord, ids::DRAINAGE_SHOVEL, level(1)).is_ok());
        assert_eq!(grid.terrain_at(coord), Some(TerrainType::WaterChannel));
        assert!(inv.is_empty());
    }

    #[test]
    fn paddy_requires_water_in_radius() {
        let mut grid = flat_grid();
        let coord = TileCoord::new(8, 8);
        let _ = grid.set_terrain_type(coord, TerrainType::DrainedMarsh);
        let mut inv = with_tool(ids::LEVELER, 1);
        let eng = engine();

        let dry = eng.try_convert(&mut grid, &mut inv, coord, ids::LEVELER, level(2));
        assert_eq!(
            dry.map_err(|e| e.reason()),
            Err(homestead_types::RejectionReason::AdjacencyUnmet)
        );
        assert_eq!(inv.count(ids::LEVELER), 1);

        let _ = grid.set_terrain_type(TileCoord::new(5, 8), TerrainType::Water);
        let wet = eng.try_convert(&mut grid, &mut inv, coord, ids::LEVELER, level(2));
        assert_eq!(wet.map(|o| o.to), Ok(TerrainType::Paddy));
    }

    #[test]
    fn locked_tool_is_not_unlocked() {
        let mut grid = flat_grid();
        let coord = TileCoord::new(8, 8);
        let _ = grid.set_terrain_type(coord, TerrainType::DrainedMarsh);
        let mut inv = with_tool(ids::LEVELER, 1);
        let result = engine().try_convert(&mut grid, &mut inv, coord, ids::LEVELER, level(1));
        assert!(matches!(result, Err(CommandError::NotUnlocked { .. })));
    }

    #[test]
    fn missing_or_non_tool_items_are_rejected() {
        let mut grid = flat_grid();
        let coord = TileCoord::new(1, 1);
        let _ = grid.set_terrain_type(coord, TerrainType::Dirt);
        let mut inv = with_tool(ids::WOOD, 5);
        let eng = engine();
        assert_eq!(
            eng.try_convert(&mut grid, &mut inv, coord, ids::WOOD, level(1)),
            Err(CommandError::NotATerrainTool(ids::WOOD))
        );
        assert!(matches!(
            eng.try_convert(&mut grid, &mut inv, coord, ids::STONE_HOE, level(1)),
            Err(CommandError::InsufficientResource { .. })
        ));
    }

    #[test]
    fn find_usable_tool_prefers_highest_tier() {
        let mut grid = flat_grid();
        let coord = TileCoord::new(2, 2);
        let _ = grid.set_terrain_type(coord, TerrainType::Dirt);
        let mut inv = with_tool(ids::STONE_HOE, 1);
        let _ = inv.add(ids::IRON_HOE, 1);
        let eng = engine();

        assert_eq!(eng.find_usable_tool(&grid, &inv, coord, level(2)), Some(ids::IRON_HOE));
        // Iron hoe is locked at level 1.
        assert_eq!(eng.find_usable_tool(&grid, &inv, coord, level(1)), Some(ids::STONE_HOE));
        // Farmland is protected.
        let _ = grid.set_terrain_type(coord, TerrainType::Farmland);
        assert_eq!(eng.find_usable_tool(&grid, &inv, coord, level(2)), None);
    }
}
