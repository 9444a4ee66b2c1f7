//! Deterministic chunk generator.
//!
//! Terrain for a chunk is a pure function of the world seed and the chunk
//! coordinates. Each tile combines two sources:
//!
//! - a multi-octave `OpenSimplex2` noise value `n` in `[0, 1]`, sampled at the
//!   tile's world position (continuous across chunk borders), and
//! - a per-chunk `xorshift64` stream seeded from the chunk coordinates,
//!   consumed in row-major tile order.
//!
//! Rules, first match wins:
//!
//! | Condition                        | Terrain  |
//! |----------------------------------|----------|
//! | `n < 0.2`                        | Water    |
//! | `n < 0.3`                        | Sand     |
//! | `n > 0.8`                        | Stone    |
//! | `n > 0.7` and draw `< 0.3`       | Forest   |
//! | draw `< 0.2`                     | Dirt     |
//! | otherwise                        | Grass    |
//!
//! A draw is only taken when its rule is reached, so the stream position
//! depends on the tiles before it in the same chunk, never on other chunks
//! or on generation order.

use core::fmt;

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use homestead_types::{ChunkCoord, TerrainType, TileCoord};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const WATER_BELOW: f32 = 0.2;
const SAND_BELOW: f32 = 0.3;
const STONE_ABOVE: f32 = 0.8;
const FOREST_ABOVE: f32 = 0.7;
const FOREST_CHANCE: f32 = 0.3;
const DIRT_CHANCE: f32 = 0.2;

/// Mixing constant shared by the chunk seed hash and the stream.
const MIX: u64 = 0x517c_c1b7_2722_0a95;

/// Substitute state for `xorshift64`, which cannot leave zero.
const NONZERO_FALLBACK: u64 = 0xdead_beef_cafe_babe;

// ---------------------------------------------------------------------------
// GeneratorSettings
// ---------------------------------------------------------------------------

/// Noise parameters for the terrain generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorSettings {
    /// Fixed world seed.
    pub seed: u64,
    /// Number of fBm octaves.
    pub octaves: i32,
    /// Base noise frequency.
    pub frequency: f32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            octaves: 4,
            frequency: 0.02,
        }
    }
}

// ---------------------------------------------------------------------------
// ChunkStream
// ---------------------------------------------------------------------------

/// Sequential pseudo-random stream for one chunk.
#[derive(Debug, Clone)]
struct ChunkStream {
    state: u64,
}

impl ChunkStream {
    fn for_chunk(world_seed: u64, chunk: ChunkCoord) -> Self {
        Self {
            state: chunk_seed(world_seed, chunk),
        }
    }

    const fn next_u64(&mut self) -> u64 {
        let mut state = self.state;
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        self.state = state;
        state
    }

    /// Next draw in `[0, 1)`.
    fn next_unit(&mut self) -> f32 {
        let high = u16::try_from(self.next_u64() >> 48).unwrap_or(0);
        f32::from(high) / 65_536.0
    }
}

/// Hash the world seed and chunk coordinates into a non-zero stream seed.
fn chunk_seed(world_seed: u64, chunk: ChunkCoord) -> u64 {
    let cx = u64::from_le_bytes(i64::from(chunk.cx).to_le_bytes());
    let cy = u64::from_le_bytes(i64::from(chunk.cy).to_le_bytes());
    let mut state = world_seed
        .wrapping_add(cx.wrapping_mul(MIX))
        .rotate_left(29)
        .wrapping_add(cy.wrapping_mul(MIX.rotate_left(17)));
    // One round of splitmix-style finalization so neighboring chunks differ
    // in every bit.
    state ^= state >> 33;
    state = state.wrapping_mul(0xff51_afd7_ed55_8ccd);
    state ^= state >> 33;

    if state == 0 { NONZERO_FALLBACK } else { state }
}

// ---------------------------------------------------------------------------
// TerrainGenerator
// ---------------------------------------------------------------------------

/// Pure terrain function over chunk coordinates.
pub struct TerrainGenerator {
    settings: GeneratorSettings,
    noise: FastNoiseLite,
}

impl fmt::Debug for TerrainGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerrainGenerator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TerrainGenerator {
    /// Build a generator for the given settings.
    pub fn new(settings: GeneratorSettings) -> Self {
        let noise_seed = i32::try_from(settings.seed & 0x7fff_ffff).unwrap_or(0);
        let mut noise = FastNoiseLite::with_seed(noise_seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(settings.frequency));
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(settings.octaves.max(1)));
        Self { settings, noise }
    }

    /// The settings this generator was built with.
    pub const fn settings(&self) -> GeneratorSettings {
        self.settings
    }

    /// Normalized noise value at a tile, in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)] // sampling position only; exactness is irrelevant
    pub fn noise_at(&self, coord: TileCoord) -> f32 {
        let raw = self.noise.get_noise_2d(coord.x as f32, coord.y as f32);
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Generate every tile of a chunk, in row-major order.
    pub fn generate_chunk(&self, chunk: ChunkCoord) -> Vec<(TileCoord, TerrainType)> {
        let mut stream = ChunkStream::for_chunk(self.settings.seed, chunk);
        chunk
            .tiles()
            .map(|coord| (coord, classify(self.noise_at(coord), &mut stream)))
            .collect()
    }
}

fn classify(n: f32, stream: &mut ChunkStream) -> TerrainType {
    if n < WATER_BELOW {
        TerrainType::Water
    } else if n < SAND_BELOW {
        TerrainType::Sand
    } else if n > STONE_ABOVE {
        TerrainType::Stone
    } else if n > FOREST_ABOVE && stream.next_unit() < FOREST_CHANCE {
        TerrainType::Forest
    } else if stream.next_unit() < DIRT_CHANCE {
        TerrainType::Dirt
    } else {
        TerrainType::Grass
    }
}
