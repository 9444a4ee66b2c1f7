//! Configuration loading and typed config structures for the homestead
//! simulation.
//!
//! The canonical configuration lives in `homestead-config.yaml` at the
//! project root. Every field is optional in the file; missing fields take
//! the defaults below, so an empty document is a valid configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use homestead_economy::defaults::ids;
use homestead_types::{ItemId, TileCoord};
use homestead_world::{
    DEFAULT_CROP_STAGE_SECONDS, DEFAULT_LIVESTOCK_STAGE_SECONDS, DEFAULT_VIEW_MARGIN,
    DEFAULT_WATER_SEARCH_RADIUS, GeneratorSettings,
};

/// Environment variable that replaces `catalog.path`.
pub const CATALOG_PATH_ENV: &str = "HOMESTEAD_CATALOG";

/// Largest accepted `conversion.water_search_radius`.
pub const MAX_WATER_SEARCH_RADIUS: u32 = 32;

/// Highest level reachable through a defined transition.
const HIGHEST_TRANSITION_LEVEL: u8 = 4;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but its values contradict each other.
    #[error("invalid config: {reason}")]
    Invalid {
        /// Which value was rejected and why.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `homestead-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World name, seed, and generator parameters.
    #[serde(default)]
    pub world: WorldConfig,

    /// Production item ids and growth timings.
    #[serde(default)]
    pub production: ProductionConfig,

    /// Terrain conversion parameters.
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Civilization level thresholds.
    #[serde(default)]
    pub progression: ProgressionConfig,

    /// Player start state.
    #[serde(default)]
    pub player: PlayerConfig,

    /// Catalog file location.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Headless run bounds.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `HOMESTEAD_CATALOG` overrides `catalog.path` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if [`validate`](Self::validate) fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.validate()?;
        config.catalog.apply_env_override();
        Ok(config)
    }

    /// Check value ranges and orderings that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first rejected value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let progression = &self.progression;
        if progression.product_threshold_b <= progression.product_threshold_a {
            return Err(invalid(format!(
                "progression.product_threshold_b ({}) must exceed product_threshold_a ({})",
                progression.product_threshold_b, progression.product_threshold_a
            )));
        }
        if !(1..=HIGHEST_TRANSITION_LEVEL).contains(&progression.top_implemented_level) {
            return Err(invalid(format!(
                "progression.top_implemented_level ({}) must be in 1..={HIGHEST_TRANSITION_LEVEL}",
                progression.top_implemented_level
            )));
        }

        let production = &self.production;
        if !strictly_increasing(&production.crop_stage_seconds) {
            return Err(invalid(format!(
                "production.crop_stage_seconds {:?} must be positive and strictly increasing",
                production.crop_stage_seconds
            )));
        }
        if !strictly_increasing(&production.livestock_stage_seconds) {
            return Err(invalid(format!(
                "production.livestock_stage_seconds {:?} must be positive and strictly increasing",
                production.livestock_stage_seconds
            )));
        }

        if self.conversion.water_search_radius > MAX_WATER_SEARCH_RADIUS {
            return Err(invalid(format!(
                "conversion.water_search_radius ({}) exceeds {MAX_WATER_SEARCH_RADIUS}",
                self.conversion.water_search_radius
            )));
        }
        if self.world.view_margin_chunks < 0 {
            return Err(invalid(format!(
                "world.view_margin_chunks ({}) must not be negative",
                self.world.view_margin_chunks
            )));
        }
        Ok(())
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Generator settings derived from the world section.
    pub const fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            seed: self.world.seed,
            octaves: self.world.noise_octaves,
            frequency: self.world.noise_frequency,
        }
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// Every value finite, the first above zero, each above the one before.
fn strictly_increasing(seconds: &[f32]) -> bool {
    let mut previous = 0.0_f32;
    seconds.iter().all(|&s| {
        let ok = s.is_finite() && s > previous;
        previous = s;
        ok
    })
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable world name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Fixed seed for terrain generation and species draws.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Chunks generated beyond each viewport edge.
    #[serde(default = "default_view_margin_chunks")]
    pub view_margin_chunks: i32,

    /// fBm octaves of the terrain noise.
    #[serde(default = "default_noise_octaves")]
    pub noise_octaves: i32,

    /// Base frequency of the terrain noise.
    #[serde(default = "default_noise_frequency")]
    pub noise_frequency: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            view_margin_chunks: default_view_margin_chunks(),
            noise_octaves: default_noise_octaves(),
            noise_frequency: default_noise_frequency(),
        }
    }
}

/// Production configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductionConfig {
    /// Item consumed by planting.
    #[serde(default = "default_seed_item")]
    pub seed_item: ItemId,

    /// Item granted by a harvest.
    #[serde(default = "default_crop_item")]
    pub crop_item: ItemId,

    /// Item consumed when placing an animal.
    #[serde(default = "default_feed_item")]
    pub feed_item: ItemId,

    /// Seconds after planting at which crop stages 1, 2 and 3 are reached.
    #[serde(default = "default_crop_stage_seconds")]
    pub crop_stage_seconds: [f32; 3],

    /// Seconds after placement at which animal stages 1 and 2 are reached.
    #[serde(default = "default_livestock_stage_seconds")]
    pub livestock_stage_seconds: [f32; 2],
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            seed_item: default_seed_item(),
            crop_item: default_crop_item(),
            feed_item: default_feed_item(),
            crop_stage_seconds: default_crop_stage_seconds(),
            livestock_stage_seconds: default_livestock_stage_seconds(),
        }
    }
}

/// Terrain conversion configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ConversionConfig {
    /// Chebyshev radius searched for water when levelling a paddy.
    #[serde(default = "default_water_search_radius")]
    pub water_search_radius: u32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            water_search_radius: default_water_search_radius(),
        }
    }
}

/// Civilization level thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProgressionConfig {
    /// Preserved food of a single item needed for level 1 -> 2.
    #[serde(default = "default_preserved_food_threshold")]
    pub preserved_food_threshold: u32,

    /// Lifetime livestock products needed for level 2 -> 3.
    #[serde(default = "default_product_threshold_a")]
    pub product_threshold_a: u64,

    /// Lifetime livestock products needed for level 3 -> 4.
    #[serde(default = "default_product_threshold_b")]
    pub product_threshold_b: u64,

    /// Highest level with a defined transition into it.
    #[serde(default = "default_top_implemented_level")]
    pub top_implemented_level: u8,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            preserved_food_threshold: default_preserved_food_threshold(),
            product_threshold_a: default_product_threshold_a(),
            product_threshold_b: default_product_threshold_b(),
            top_implemented_level: default_top_implemented_level(),
        }
    }
}

/// Player start state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerConfig {
    /// Tile the player starts on.
    #[serde(default)]
    pub start_position: TileCoord,

    /// Items held at the start (item id -> quantity).
    #[serde(default = "default_starting_inventory")]
    pub starting_inventory: BTreeMap<ItemId, u32>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_position: TileCoord::default(),
            starting_inventory: default_starting_inventory(),
        }
    }
}

/// Catalog file location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogConfig {
    /// Path of the catalog YAML.
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl CatalogConfig {
    /// Replace `path` with `HOMESTEAD_CATALOG` if it is set and non-empty.
    pub fn apply_env_override(&mut self) {
        if let Ok(path) = std::env::var(CATALOG_PATH_ENV) {
            if !path.trim().is_empty() {
                self.path = PathBuf::from(path);
            }
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// Bounds for a headless run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunConfig {
    /// Number of steps to run before writing the snapshot.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,

    /// Simulated seconds per step.
    #[serde(default = "default_step_seconds")]
    pub step_seconds: f32,

    /// Tiles visible around the player each step.
    #[serde(default = "default_view_radius")]
    pub view_radius: i32,

    /// Where the final snapshot is written.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            step_seconds: default_step_seconds(),
            view_radius: default_view_radius(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Homestead".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_view_margin_chunks() -> i32 {
    DEFAULT_VIEW_MARGIN
}

const fn default_noise_octaves() -> i32 {
    4
}

const fn default_noise_frequency() -> f32 {
    0.02
}

const fn default_seed_item() -> ItemId {
    ids::SEED
}

const fn default_crop_item() -> ItemId {
    ids::WHEAT
}

const fn default_feed_item() -> ItemId {
    ids::FEED
}

const fn default_crop_stage_seconds() -> [f32; 3] {
    DEFAULT_CROP_STAGE_SECONDS
}

const fn default_livestock_stage_seconds() -> [f32; 2] {
    DEFAULT_LIVESTOCK_STAGE_SECONDS
}

const fn default_water_search_radius() -> u32 {
    DEFAULT_WATER_SEARCH_RADIUS
}

const fn default_preserved_food_threshold() -> u32 {
    10
}

const fn default_product_threshold_a() -> u64 {
    10
}

const fn default_product_threshold_b() -> u64 {
    30
}

const fn default_top_implemented_level() -> u8 {
    4
}

/// Nothing in the world yields seed, feed, salt, wood, stone or clay, so the
/// start covers the whole climb: ten pickled foods, four hens, field tools,
/// and a temple.
fn default_starting_inventory() -> BTreeMap<ItemId, u32> {
    BTreeMap::from([
        (ids::WOOD, 30),
        (ids::STONE, 40),
        (ids::SEED, 24),
        (ids::FEED, 4),
        (ids::SALT, 12),
        (ids::CLAY, 12),
    ])
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("homestead-catalog.yaml")
}

const fn default_max_steps() -> u64 {
    600
}

const fn default_step_seconds() -> f32 {
    0.5
}

const fn default_view_radius() -> i32 {
    12
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("homestead-snapshot.json")
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.view_margin_chunks, 1);
        assert_eq!(config.conversion.water_search_radius, 3);
        assert_eq!(config.progression.preserved_food_threshold, 10);
        assert_eq!(config.progression.product_threshold_a, 10);
        assert_eq!(config.progression.product_threshold_b, 30);
        assert_eq!(config.production.seed_item, ids::SEED);
    }

    #[test]
    fn empty_document_is_default() {
        let parsed = SimulationConfig::parse("");
        assert!(parsed.is_ok());
        assert_eq!(
            parsed.unwrap_or_else(|_| SimulationConfig {
                world: WorldConfig {
                    seed: 0,
                    ..WorldConfig::default()
                },
                ..SimulationConfig::default()
            }),
            SimulationConfig::default()
        );
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r"
world:
  name: Riverside
  seed: 7
production:
  crop_stage_seconds: [1.0, 2.0, 4.0]
player:
  start_position: { x: -3, y: 9 }
  starting_inventory:
    3: 2
    5: 1
progression:
  product_threshold_b: 50
";
        let config = SimulationConfig::parse(yaml).unwrap_or_default();
        assert_eq!(config.world.name, "Riverside");
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.noise_octaves, 4);
        assert_eq!(config.production.crop_stage_seconds, [1.0, 2.0, 4.0]);
        assert_eq!(config.player.start_position, TileCoord::new(-3, 9));
        assert_eq!(config.player.starting_inventory.get(&ids::SEED), Some(&2));
        assert_eq!(config.progression.product_threshold_a, 10);
        assert_eq!(config.progression.product_threshold_b, 50);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(SimulationConfig::parse("world: [unclosed").is_err());
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(SimulationConfig::default().validate().is_ok());
        let config = SimulationConfig::default();
        assert!(config.player.starting_inventory.get(&ids::SALT) >= Some(&10));
        assert!(config.player.starting_inventory.contains_key(&ids::CLAY));
    }

    fn rejected(yaml: &str) -> bool {
        let parsed = SimulationConfig::parse(yaml);
        assert!(parsed.is_ok(), "{yaml} should parse");
        matches!(
            parsed.map(|config| config.validate()),
            Ok(Err(ConfigError::Invalid { .. }))
        )
    }

    #[test]
    fn product_thresholds_must_increase() {
        assert!(rejected("progression: { product_threshold_a: 30, product_threshold_b: 30 }"));
        assert!(rejected("progression: { product_threshold_a: 40 }"));
        assert!(!rejected("progression: { product_threshold_a: 5, product_threshold_b: 6 }"));
    }

    #[test]
    fn top_level_must_have_a_transition() {
        assert!(rejected("progression: { top_implemented_level: 5 }"));
        assert!(rejected("progression: { top_implemented_level: 0 }"));
        assert!(!rejected("progression: { top_implemented_level: 2 }"));
    }

    #[test]
    fn stage_seconds_must_increase() {
        assert!(rejected("production: { crop_stage_seconds: [3.0, 3.0, 10.0] }"));
        assert!(rejected("production: { crop_stage_seconds: [0.0, 1.0, 2.0] }"));
        assert!(rejected("production: { livestock_stage_seconds: [10.0, 5.0] }"));
        assert!(!rejected("production: { crop_stage_seconds: [0.5, 1.0, 1.5] }"));
    }

    #[test]
    fn water_search_radius_is_bounded() {
        assert!(rejected("conversion: { water_search_radius: 100000 }"));
        assert!(!rejected("conversion: { water_search_radius: 32 }"));
    }

    #[test]
    fn from_file_validates() {
        let path = std::env::temp_dir().join(format!(
            "homestead-config-invalid-{}.yaml",
            std::process::id()
        ));
        let written = std::fs::write(&path, "progression: { top_implemented_level: 7 }\n");
        assert!(written.is_ok());
        let result = SimulationConfig::from_file(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/homestead-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
