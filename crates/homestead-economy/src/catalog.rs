//! Static item and livestock catalogs.
//!
//! A [`Catalog`] is loaded once at startup (see [`crate::loader`]) and then
//! shared read-only, behind an `Arc`, with every component that needs item
//! or species data. Nothing mutates a catalog after construction.

use std::collections::BTreeMap;

use serde::Serialize;

use homestead_types::{CivilizationLevel, ItemCategory, ItemId, LivestockId, TerrainToolClass};

// ---------------------------------------------------------------------------
// ItemData
// ---------------------------------------------------------------------------

/// One item definition, with its recipe folded in when it is craftable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemData {
    /// Catalog id.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Relative quality; higher tiers win when choosing between tools.
    pub tier: u32,
    /// Catalog category.
    pub category: ItemCategory,
    /// Icon key for the presentation layer.
    pub icon: String,
    /// Whether a recipe produces this item.
    pub craftable: bool,
    /// Items consumed by one craft.
    pub materials: BTreeMap<ItemId, u32>,
    /// Items that must be held (at least one) but are not consumed.
    pub requirements: BTreeMap<ItemId, u32>,
    /// Level at which the item (and its recipe) becomes available.
    pub required_level: CivilizationLevel,
    /// Units produced per craft.
    pub result_amount: u32,
    /// Terrain conversion class, when the item is a terrain tool.
    pub tool_class: Option<TerrainToolClass>,
    /// Whether crafted units are routed into the preserved-food store.
    pub preserved: bool,
}

impl ItemData {
    /// A plain, non-craftable item available from the first level.
    pub fn basic(id: ItemId, name: &str, category: ItemCategory) -> Self {
        Self {
            id,
            name: name.to_owned(),
            description: String::new(),
            tier: 1,
            category,
            icon: String::new(),
            craftable: false,
            materials: BTreeMap::new(),
            requirements: BTreeMap::new(),
            required_level: CivilizationLevel::MIN,
            result_amount: 1,
            tool_class: None,
            preserved: false,
        }
    }

    /// Whether the item converts terrain.
    pub const fn is_terrain_tool(&self) -> bool {
        self.tool_class.is_some()
    }
}

// ---------------------------------------------------------------------------
// LivestockData
// ---------------------------------------------------------------------------

/// One livestock species definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LivestockData {
    /// Catalog id.
    pub id: LivestockId,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Item granted when the animal is killed.
    pub meat_item: ItemId,
    /// Item produced periodically by a mature animal, if any.
    pub product_item: Option<ItemId>,
    /// Seconds between products once mature.
    pub product_interval: f32,
    /// Level at which the species can be placed.
    pub required_level: CivilizationLevel,
    /// RGB tint for the presentation layer.
    pub color: [u8; 3],
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Read-only registry of every item and species.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    items: BTreeMap<ItemId, ItemData>,
    livestock: BTreeMap<LivestockId, LivestockData>,
}

impl Catalog {
    /// Create a catalog from fully-built item and species maps.
    pub const fn new(
        items: BTreeMap<ItemId, ItemData>,
        livestock: BTreeMap<LivestockId, LivestockData>,
    ) -> Self {
        Self { items, livestock }
    }

    /// Look up an item.
    pub fn item(&self, id: ItemId) -> Option<&ItemData> {
        self.items.get(&id)
    }

    /// Look up a species.
    pub fn species(&self, id: LivestockId) -> Option<&LivestockData> {
        self.livestock.get(&id)
    }

    /// Iterate every item in id order.
    pub fn items(&self) -> impl Iterator<Item = &ItemData> {
        self.items.values()
    }

    /// Iterate every species in id order.
    pub fn all_species(&self) -> impl Iterator<Item = &LivestockData> {
        self.livestock.values()
    }

    /// Species that can be placed at `level`, in id order.
    pub fn species_available(&self, level: CivilizationLevel) -> Vec<&LivestockData> {
        self.livestock
            .values()
            .filter(|s| level.is_item_available(s.required_level))
            .collect()
    }

    /// Every terrain tool of the given class, in id order.
    pub fn tools_of_class(&self, class: TerrainToolClass) -> impl Iterator<Item = &ItemData> {
        self.items
            .values()
            .filter(move |item| item.tool_class == Some(class))
    }

    /// Number of items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of species.
    pub fn species_count(&self) -> usize {
        self.livestock.len()
    }

    pub(crate) fn contains_item(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub(crate) fn insert_item_if_absent(&mut self, item: ItemData) -> bool {
        if self.items.contains_key(&item.id) {
            return false;
        }
        self.items.insert(item.id, item);
        true
    }

    pub(crate) fn insert_species_if_absent(&mut self, species: LivestockData) -> bool {
        if self.livestock.contains_key(&species.id) {
            return false;
        }
        self.livestock.insert(species.id, species);
        true
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut ItemData> {
        self.items.get_mut(&id)
    }
}
