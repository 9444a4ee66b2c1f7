//! The tile map: generated terrain keyed by coordinate.
//!
//! [`WorldGrid`] owns every generated tile and the set of chunks that have
//! been generated. Chunks are generated lazily around the viewport; once a
//! tile exists it is never removed, and its terrain changes only through
//! [`WorldGrid::set_terrain_type`].

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use homestead_economy::CommandError;
use homestead_types::{ChunkCoord, TerrainType, TileCoord, Viewport};

use crate::generator::{GeneratorSettings, TerrainGenerator};

/// Default number of extra chunks generated beyond the viewport edge.
pub const DEFAULT_VIEW_MARGIN: i32 = 1;

// ---------------------------------------------------------------------------
// TerrainTile
// ---------------------------------------------------------------------------

/// A single generated tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainTile {
    /// Position in world space.
    pub coord: TileCoord,
    /// Current surface type.
    pub terrain: TerrainType,
    /// Whether the map overlay has revealed this tile.
    pub explored: bool,
}

// ---------------------------------------------------------------------------
// WorldGrid
// ---------------------------------------------------------------------------

/// Generated terrain plus the chunk generator that produces it.
#[derive(Debug)]
pub struct WorldGrid {
    generator: TerrainGenerator,
    tiles: HashMap<TileCoord, TerrainTile>,
    generated: BTreeSet<ChunkCoord>,
    view_margin: i32,
}

impl WorldGrid {
    /// Create an empty grid. No chunks exist until the first
    /// [`generate_in_view`](Self::generate_in_view) call.
    pub fn new(settings: GeneratorSettings, view_margin: i32) -> Self {
        Self {
            generator: TerrainGenerator::new(settings),
            tiles: HashMap::new(),
            generated: BTreeSet::new(),
            view_margin: view_margin.max(0),
        }
    }

    /// The generator backing this grid.
    pub const fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Generate every chunk covering `viewport` plus the view margin that
    /// does not exist yet. Safe to call every step.
    ///
    /// Returns the number of chunks generated by this call.
    pub fn generate_in_view(&mut self, viewport: Viewport) -> usize {
        let mut created: usize = 0;
        for chunk in viewport.chunks_with_margin(self.view_margin) {
            if self.generate_chunk(chunk) {
                created = created.saturating_add(1);
            }
        }
        if created > 0 {
            debug!(
                chunks = created,
                total = self.generated.len(),
                "Generated terrain chunks"
            );
        }
        created
    }

    /// Generate a single chunk if it is not generated yet.
    ///
    /// Returns `true` when the chunk was newly generated.
    pub fn generate_chunk(&mut self, chunk: ChunkCoord) -> bool {
        if !self.generated.insert(chunk) {
            return false;
        }
        for (coord, terrain) in self.generator.generate_chunk(chunk) {
            self.tiles.insert(
                coord,
                TerrainTile {
                    coord,
                    terrain,
                    explored: true,
                },
            );
        }
        true
    }

    /// Look up a generated tile.
    pub fn get_tile(&self, coord: TileCoord) -> Option<&TerrainTile> {
        self.tiles.get(&coord)
    }

    /// Terrain of a generated tile.
    pub fn terrain_at(&self, coord: TileCoord) -> Option<TerrainType> {
        self.tiles.get(&coord).map(|tile| tile.terrain)
    }

    /// Replace the terrain of a generated tile, returning the previous type.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidTerrain`] if the tile has not been
    /// generated.
    pub fn set_terrain_type(
        &mut self,
        coord: TileCoord,
        terrain: TerrainType,
    ) -> Result<TerrainType, CommandError> {
        let tile = self
            .tiles
            .get_mut(&coord)
            .ok_or(CommandError::InvalidTerrain {
                coord,
                terrain: None,
            })?;
        let previous = tile.terrain;
        tile.terrain = terrain;
        Ok(previous)
    }

    /// Whether a chunk has been generated.
    pub fn is_generated(&self, chunk: ChunkCoord) -> bool {
        self.generated.contains(&chunk)
    }

    /// Generated chunks in coordinate order.
    pub fn generated_chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.generated.iter().copied()
    }

    /// Number of generated chunks.
    pub fn generated_chunk_count(&self) -> usize {
        self.generated.len()
    }

    /// Number of generated tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Generated tiles within Chebyshev distance `radius` of `center`,
    /// including the center itself.
    pub fn tiles_in_radius(
        &self,
        center: TileCoord,
        radius: u32,
    ) -> impl Iterator<Item = &TerrainTile> + '_ {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let span = -r..=r;
        span.clone()
            .flat_map(move |dy| span.clone().map(move |dx| center.offset(dx, dy)))
            .filter_map(|coord| self.tiles.get(&coord))
    }

    /// Whether any generated tile within `radius` of `center` is a water
    /// source (water, water channel, or paddy).
    pub fn has_water_within(&self, center: TileCoord, radius: u32) -> bool {
        self.tiles_in_radius(center, radius)
            .any(|tile| tile.terrain.attributes().water_source)
    }

    /// Tiles whose terrain differs from what the generator produces, in
    /// coordinate order. Together with the generated-chunk set this is
    /// enough to rebuild the grid exactly.
    pub fn terrain_overrides(&self) -> Vec<(TileCoord, TerrainType)> {
        let mut overrides: Vec<(TileCoord, TerrainType)> = self
            .generated
            .iter()
            .flat_map(|&chunk| self.generator.generate_chunk(chunk))
            .filter_map(|(coord, generated)| {
                self.terrain_at(coord)
                    .filter(|&current| current != generated)
                    .map(|current| (coord, current))
            })
            .collect();
        overrides.sort_unstable_by_key(|&(coord, _)| coord);
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> WorldGrid {
        WorldGrid::new(GeneratorSettings::default(), DEFAULT_VIEW_MARGIN)
    }

    #[test]
    fn generate_in_view_adds_margin_and_is_idempotent() {
        let mut g = grid();
        let view = Viewport::new(TileCoord::new(0, 0), TileCoord::new(15, 15));
        // One chunk plus one chunk of margin on each side: 3x3.
        assert_eq!(g.generate_in_view(view), 9);
        assert_eq!(g.generate_in_view(view), 0);
        assert_eq!(g.generated_chunk_count(), 9);
        assert_eq!(g.tile_count(), 9 * 256);
    }

    #[test]
    fn ungenerated_tiles_are_absent() {
        let g = grid();
        assert!(g.get_tile(TileCoord::new(0, 0)).is_none());
    }

    #[test]
    fn generated_tiles_are_explored() {
        let mut g = grid();
        assert!(g.generate_chunk(ChunkCoord::new(-3, 4)));
        let tile = g.get_tile(ChunkCoord::new(-3, 4).origin());
        assert!(tile.is_some_and(|t| t.explored));
    }

    #[test]
    fn generation_order_does_not_change_terrain() {
        let mut forward = grid();
        let mut backward = grid();
        let chunks: Vec<ChunkCoord> = (-2..=2).map(|c| ChunkCoord::new(c, -c)).collect();
        for &c in &chunks {
            forward.generate_chunk(c);
        }
        for &c in chunks.iter().rev() {
            backward.generate_chunk(c);
        }
        for c in chunks {
            for coord in c.tiles() {
                assert_eq!(forward.terrain_at(coord), backward.terrain_at(coord));
            }
        }
    }

    #[test]
    fn set_terrain_requires_generated_tile() {
        let mut g = grid();
        assert!(g.set_terrain_type(TileCoord::new(5, 5), TerrainType::Marsh).is_err());
        g.generate_chunk(ChunkCoord::new(0, 0));
        assert!(g.set_terrain_type(TileCoord::new(5, 5), TerrainType::Marsh).is_ok());
        assert_eq!(g.terrain_at(TileCoord::new(5, 5)), Some(TerrainType::Marsh));
    }

    #[test]
    fn overrides_record_only_changed_tiles() {
        let mut g = grid();
        g.generate_chunk(ChunkCoord::new(0, 0));
        assert!(g.terrain_overrides().is_empty());

        let coord = TileCoord::new(2, 3);
        let original = g.terrain_at(coord).unwrap_or(TerrainType::Grass);
        let replacement = if original == TerrainType::Barren {
            TerrainType::Paddy
        } else {
            TerrainType::Barren
        };
        assert!(g.set_terrain_type(coord, replacement).is_ok());
        assert_eq!(g.terrain_overrides(), vec![(coord, replacement)]);
    }

    #[test]
    fn water_search_uses_chebyshev_radius() {
        let mut g = grid();
        g.generate_chunk(ChunkCoord::new(0, 0));
        for coord in ChunkCoord::new(0, 0).tiles() {
            assert!(g.set_terrain_type(coord, TerrainType::Grass).is_ok());
        }
        let center = TileCoord::new(8, 8);
        assert!(!g.has_water_within(center, 3));

        assert!(g.set_terrain_type(TileCoord::new(11, 5), TerrainType::WaterChannel).is_ok());
        assert!(g.has_water_within(center, 3));
        assert!(!g.has_water_within(center, 2));
    }

    #[test]
    fn tiles_serialize_with_terrain_names() {
        let tile = TerrainTile {
            coord: TileCoord::new(1, -2),
            terrain: TerrainType::DrainedMarsh,
            explored: true,
        };
        let json = serde_json::to_string(&tile).unwrap_or_default();
        assert!(json.contains("\"DRAINED_MARSH\""));
        assert!(json.contains("\"y\":-2"));
    }

    #[test]
    fn radius_query_counts_square() {
        let mut g = grid();
        g.generate_chunk(ChunkCoord::new(0, 0));
        assert_eq!(g.tiles_in_radius(TileCoord::new(8, 8), 1).count(), 9);
        // Corner tile: only a quarter of the square is generated.
        assert_eq!(g.tiles_in_radius(TileCoord::new(0, 0), 1).count(), 4);
    }
}
