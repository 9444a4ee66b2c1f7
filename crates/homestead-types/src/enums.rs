//! Enumeration types shared by every simulation crate.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Surface type of a single world tile.
///
/// Natural types come out of chunk generation; the remaining types are only
/// reachable through terrain conversion (and `Barren`, which no generator or
/// conversion produces today but which remains buildable land).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum TerrainType {
    // --- Natural ---
    /// Default open land.
    Grass,
    /// Bare soil, ready to be hoed.
    Dirt,
    /// Shoreline sand.
    Sand,
    /// Open water.
    Water,
    /// Rock outcrop.
    Stone,
    /// Wooded land.
    Forest,
    /// Waterlogged ground.
    Marsh,

    // --- Converted ---
    /// Flooded rice field.
    Paddy,
    /// Tilled land for crops.
    Farmland,
    /// Marsh after drainage.
    DrainedMarsh,
    /// Dug irrigation channel.
    WaterChannel,
    /// Exhausted land.
    Barren,
}

impl TerrainType {
    /// Every terrain type, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Grass,
        Self::Dirt,
        Self::Sand,
        Self::Water,
        Self::Stone,
        Self::Forest,
        Self::Marsh,
        Self::Paddy,
        Self::Farmland,
        Self::DrainedMarsh,
        Self::WaterChannel,
        Self::Barren,
    ];
}

/// Transition class of a terrain tool.
///
/// Each class owns a set of rows in the terrain conversion table. Several
/// items may share a class at different tiers (e.g. a stone hoe and an iron
/// hoe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TerrainToolClass {
    /// Tills dirt into farmland.
    Hoe,
    /// Digs water channels and drains marshes.
    DrainageShovel,
    /// Levels drained marsh into paddy.
    Leveler,
}

impl TerrainToolClass {
    /// Name keywords used to classify catalog items that carry no explicit
    /// tool class.
    pub const fn name_keywords(self) -> &'static [&'static str] {
        match self {
            Self::Hoe => &["hoe"],
            Self::DrainageShovel => &["shovel", "spade"],
            Self::Leveler => &["leveler", "leveller"],
        }
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Catalog category of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ItemCategory {
    /// Gathered raw material (wood, stone).
    RawMaterial,
    /// Processed material; preserved foods live here.
    IntermediateMaterial,
    /// Hand tool, including terrain tools.
    Tool,
    /// Edible produce.
    Food,
    /// Plantable seed.
    Seed,
    /// Animal feed.
    Feed,
    /// Held facility that enables recipes.
    Facility,
    /// Anything the catalog does not classify.
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// A kind of immutable building that can be placed on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BuildingType {
    /// Family dwelling.
    House,
    /// Grain storage.
    Granary,
    /// Crafting hall.
    Workshop,
    /// Livestock shelter.
    Barn,
    /// Monument that opens the ending once the top tier is reached.
    Temple,
}

impl BuildingType {
    /// Every building type, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::House,
        Self::Granary,
        Self::Workshop,
        Self::Barn,
        Self::Temple,
    ];
}

// ---------------------------------------------------------------------------
// Command rejection
// ---------------------------------------------------------------------------

/// Coarse classification of why a player command was rejected.
///
/// These are local and recoverable; the caller decides how to surface them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// Missing seed, feed, material, or tool.
    InsufficientResource,
    /// Already occupied, already built, or not yet harvestable.
    InvalidState,
    /// Wrong source terrain for the action.
    InvalidTerrain,
    /// No qualifying tile nearby.
    AdjacencyUnmet,
    /// Civilization level too low.
    NotUnlocked,
}
