//! Tile and chunk coordinates for the unbounded world grid.
//!
//! The world extends infinitely in both axes, so every coordinate is a signed
//! integer. Chunk coordinates are derived with Euclidean division so that
//! tile `-1` belongs to chunk `-1`, not chunk `0`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Edge length of a square generation chunk, in tiles.
pub const CHUNK_SIZE: i32 = 16;

/// A single tile position in world space.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct TileCoord {
    /// Horizontal tile index.
    pub x: i32,
    /// Vertical tile index.
    pub y: i32,
}

impl TileCoord {
    /// Create a tile coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return the chunk that contains this tile.
    pub const fn chunk(self) -> ChunkCoord {
        ChunkCoord {
            cx: self.x.div_euclid(CHUNK_SIZE),
            cy: self.y.div_euclid(CHUNK_SIZE),
        }
    }

    /// Offset this coordinate, saturating at the `i32` bounds.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Chebyshev (king-move) distance to another tile.
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }
}

impl core::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Identifier of a generation chunk.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct ChunkCoord {
    /// Horizontal chunk index.
    pub cx: i32,
    /// Vertical chunk index.
    pub cy: i32,
}

impl ChunkCoord {
    /// Lowest chunk index that contains an `i32` tile.
    pub const MIN_INDEX: i32 = i32::MIN.div_euclid(CHUNK_SIZE);

    /// Highest chunk index that contains an `i32` tile.
    pub const MAX_INDEX: i32 = i32::MAX.div_euclid(CHUNK_SIZE);

    /// Create a chunk coordinate.
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    /// Return the tile at the top-left (minimum) corner of this chunk.
    pub const fn origin(self) -> TileCoord {
        TileCoord {
            x: self.cx.saturating_mul(CHUNK_SIZE),
            y: self.cy.saturating_mul(CHUNK_SIZE),
        }
    }

    /// Iterate every tile in this chunk in row-major order.
    pub fn tiles(self) -> impl Iterator<Item = TileCoord> {
        let origin = self.origin();
        (0..CHUNK_SIZE).flat_map(move |dy| (0..CHUNK_SIZE).map(move |dx| origin.offset(dx, dy)))
    }
}

impl core::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {}]", self.cx, self.cy)
    }
}

/// Inclusive rectangle of tiles visible to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Viewport {
    /// Minimum (top-left) visible tile.
    pub min: TileCoord,
    /// Maximum (bottom-right) visible tile, inclusive.
    pub max: TileCoord,
}

impl Viewport {
    /// Create a viewport from two corners in any order.
    pub fn new(a: TileCoord, b: TileCoord) -> Self {
        Self {
            min: TileCoord::new(a.x.min(b.x), a.y.min(b.y)),
            max: TileCoord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// A square viewport of `radius` tiles around `center`.
    pub const fn around(center: TileCoord, radius: i32) -> Self {
        Self {
            min: center.offset(-radius, -radius),
            max: center.offset(radius, radius),
        }
    }

    /// Chunk rectangle covering this viewport plus `margin` chunks on each
    /// side, in row-major order.
    ///
    /// The margin stops at the edge of the `i32` tile space: a chunk past
    /// [`ChunkCoord::MAX_INDEX`] would have no tiles of its own.
    pub fn chunks_with_margin(self, margin: i32) -> impl Iterator<Item = ChunkCoord> {
        let lo = self.min.chunk();
        let hi = self.max.chunk();
        let clamp = |index: i32| index.clamp(ChunkCoord::MIN_INDEX, ChunkCoord::MAX_INDEX);
        let min_cx = clamp(lo.cx.saturating_sub(margin));
        let max_cx = clamp(hi.cx.saturating_add(margin));
        let min_cy = clamp(lo.cy.saturating_sub(margin));
        let max_cy = clamp(hi.cy.saturating_add(margin));
        (min_cy..=max_cy).flat_map(move |cy| (min_cx..=max_cx).map(move |cx| ChunkCoord::new(cx, cy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_tiles_map_to_negative_chunks() {
        assert_eq!(TileCoord::new(-1, -1).chunk(), ChunkCoord::new(-1, -1));
        assert_eq!(TileCoord::new(-16, 0).chunk(), ChunkCoord::new(-1, 0));
        assert_eq!(TileCoord::new(-17, 15).chunk(), ChunkCoord::new(-2, 0));
        assert_eq!(TileCoord::new(16, 31).chunk(), ChunkCoord::new(1, 1));
    }

    #[test]
    fn chunk_tiles_cover_exactly_one_chunk() {
        let chunk = ChunkCoord::new(-3, 2);
        let tiles: Vec<TileCoord> = chunk.tiles().collect();
        assert_eq!(tiles.len(), 256);
        assert!(tiles.iter().all(|t| t.chunk() == chunk));
        assert_eq!(tiles.first().copied(), Some(TileCoord::new(-48, 32)));
    }

    #[test]
    fn viewport_margin_expands_chunk_rect() {
        let view = Viewport::new(TileCoord::new(0, 0), TileCoord::new(15, 15));
        assert_eq!(view.chunks_with_margin(0).count(), 1);
        assert_eq!(view.chunks_with_margin(1).count(), 9);
    }

    #[test]
    fn margin_stops_at_the_tile_space_edge() {
        let far = TileCoord::new(i32::MAX, i32::MIN);
        let chunks: Vec<ChunkCoord> = Viewport::around(far, 4).chunks_with_margin(2).collect();
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.cx <= ChunkCoord::MAX_INDEX && c.cy >= ChunkCoord::MIN_INDEX));

        // Every emitted chunk owns its tiles; none alias a neighbor.
        for chunk in &chunks {
            assert!(chunk.tiles().all(|t| t.chunk() == *chunk), "{chunk} aliases");
        }
        assert_eq!(ChunkCoord::new(ChunkCoord::MAX_INDEX, 0).origin().x, i32::MAX.saturating_sub(15));
        assert_eq!(ChunkCoord::new(ChunkCoord::MIN_INDEX, 0).origin().x, i32::MIN);
    }

    #[test]
    fn viewport_normalizes_corners() {
        let view = Viewport::new(TileCoord::new(5, -2), TileCoord::new(-3, 7));
        assert_eq!(view.min, TileCoord::new(-3, -2));
        assert_eq!(view.max, TileCoord::new(5, 7));
    }

    #[test]
    fn chebyshev_distance_uses_larger_axis() {
        let a = TileCoord::new(0, 0);
        assert_eq!(a.chebyshev_distance(TileCoord::new(3, -1)), 3);
        assert_eq!(a.chebyshev_distance(TileCoord::new(-2, 2)), 2);
    }
}
