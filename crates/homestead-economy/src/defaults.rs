//! Built-in default catalog.
//!
//! Used in full when the catalog file is missing or unreadable, and used to
//! backfill the critical items when a file parses but lacks them. The
//! economy is therefore always bootstrappable: seeds can be planted, crops
//! harvested, animals fed, and every terrain tool class exists.

use std::collections::BTreeMap;

use homestead_types::{CivilizationLevel, ItemCategory, ItemId, LivestockId, TerrainToolClass};

use crate::catalog::{Catalog, ItemData, LivestockData};

/// Well-known item ids of the default catalog.
pub mod ids {
    use homestead_types::{ItemId, LivestockId};

    /// Wood.
    pub const WOOD: ItemId = ItemId::new(1);
    /// Stone.
    pub const STONE: ItemId = ItemId::new(2);
    /// Wheat seed.
    pub const SEED: ItemId = ItemId::new(3);
    /// Wheat (the crop).
    pub const WHEAT: ItemId = ItemId::new(4);
    /// Animal feed.
    pub const FEED: ItemId = ItemId::new(5);
    /// Salt.
    pub const SALT: ItemId = ItemId::new(6);
    /// Clay.
    pub const CLAY: ItemId = ItemId::new(7);

    /// Beef.
    pub const BEEF: ItemId = ItemId::new(20);
    /// Milk.
    pub const MILK: ItemId = ItemId::new(21);
    /// Chicken meat.
    pub const CHICKEN_MEAT: ItemId = ItemId::new(22);
    /// Egg.
    pub const EGG: ItemId = ItemId::new(23);
    /// Mutton.
    pub const MUTTON: ItemId = ItemId::new(24);
    /// Wool.
    pub const WOOL: ItemId = ItemId::new(25);
    /// Pork.
    pub const PORK: ItemId = ItemId::new(26);

    /// Stone hoe (tier 1).
    pub const STONE_HOE: ItemId = ItemId::new(40);
    /// Iron hoe (tier 2).
    pub const IRON_HOE: ItemId = ItemId::new(41);
    /// Drainage shovel.
    pub const DRAINAGE_SHOVEL: ItemId = ItemId::new(42);
    /// Leveler.
    pub const LEVELER: ItemId = ItemId::new(43);

    /// Pickled vegetables (preserved food).
    pub const PICKLED_VEGETABLES: ItemId = ItemId::new(60);
    /// Dried meat (preserved food).
    pub const DRIED_MEAT: ItemId = ItemId::new(61);
    /// Brick.
    pub const BRICK: ItemId = ItemId::new(62);

    /// Workbench (held facility).
    pub const WORKBENCH: ItemId = ItemId::new(80);

    /// Chicken.
    pub const CHICKEN: LivestockId = LivestockId::new(1);
    /// Pig.
    pub const PIG: LivestockId = LivestockId::new(2);
    /// Cow.
    pub const COW: LivestockId = LivestockId::new(3);
    /// Sheep.
    pub const SHEEP: LivestockId = LivestockId::new(4);
}

/// Items that must exist for the economy to bootstrap. Brick and clay are
/// here because building blueprints spend brick.
pub const CRITICAL_ITEMS: [ItemId; 10] = [
    ids::SEED,
    ids::WHEAT,
    ids::FEED,
    ids::WOOD,
    ids::STONE,
    ids::CLAY,
    ids::BRICK,
    ids::STONE_HOE,
    ids::DRAINAGE_SHOVEL,
    ids::LEVELER,
];

fn level(raw: u8) -> CivilizationLevel {
    CivilizationLevel::new(raw).unwrap_or_default()
}

fn tool(id: ItemId, name: &str, tier: u32, class: TerrainToolClass) -> ItemData {
    ItemData {
        tier,
        tool_class: Some(class),
        ..ItemData::basic(id, name, ItemCategory::Tool)
    }
}

fn recipe(
    mut item: ItemData,
    materials: &[(ItemId, u32)],
    requirements: &[(ItemId, u32)],
    required_level: u8,
) -> ItemData {
    item.craftable = true;
    item.materials = materials.iter().copied().collect();
    item.requirements = requirements.iter().copied().collect();
    item.required_level = level(required_level);
    item
}

/// Every item of the default catalog.
pub fn default_items() -> Vec<ItemData> {
    vec![
        ItemData::basic(ids::WOOD, "Wood", ItemCategory::RawMaterial),
        ItemData::basic(ids::STONE, "Stone", ItemCategory::RawMaterial),
        ItemData::basic(ids::SEED, "Wheat Seed", ItemCategory::Seed),
        ItemData::basic(ids::WHEAT, "Wheat", ItemCategory::Food),
        ItemData::basic(ids::FEED, "Animal Feed", ItemCategory::Feed),
        ItemData::basic(ids::SALT, "Salt", ItemCategory::RawMaterial),
        ItemData::basic(ids::CLAY, "Clay", ItemCategory::RawMaterial),
        ItemData::basic(ids::BEEF, "Beef", ItemCategory::Food),
        ItemData::basic(ids::MILK, "Milk", ItemCategory::Food),
        ItemData::basic(ids::CHICKEN_MEAT, "Chicken Meat", ItemCategory::Food),
        ItemData::basic(ids::EGG, "Egg", ItemCategory::Food),
        ItemData::basic(ids::MUTTON, "Mutton", ItemCategory::Food),
        ItemData::basic(ids::WOOL, "Wool", ItemCategory::RawMaterial),
        ItemData::basic(ids::PORK, "Pork", ItemCategory::Food),
        recipe(
            tool(ids::STONE_HOE, "Stone Hoe", 1, TerrainToolClass::Hoe),
            &[(ids::WOOD, 2), (ids::STONE, 1)],
            &[],
            1,
        ),
        recipe(
            tool(ids::IRON_HOE, "Iron Hoe", 2, TerrainToolClass::Hoe),
            &[(ids::WOOD, 2), (ids::STONE, 3)],
            &[(ids::WORKBENCH, 1)],
            2,
        ),
        recipe(
            tool(
                ids::DRAINAGE_SHOVEL,
                "Drainage Shovel",
                1,
                TerrainToolClass::DrainageShovel,
            ),
            &[(ids::WOOD, 2), (ids::STONE, 2)],
            &[],
            1,
        ),
        recipe(
            tool(ids::LEVELER, "Leveler", 1, TerrainToolClass::Leveler),
            &[(ids::WOOD, 4), (ids::STONE, 1)],
            &[],
            2,
        ),
        recipe(
            ItemData {
                preserved: true,
                ..ItemData::basic(
                    ids::PICKLED_VEGETABLES,
                    "Pickled Vegetables",
                    ItemCategory::IntermediateMaterial,
                )
            },
            &[(ids::WHEAT, 2), (ids::SALT, 1)],
            &[],
            1,
        ),
        recipe(
            ItemData {
                preserved: true,
                ..ItemData::basic(ids::DRIED_MEAT, "Dried Meat", ItemCategory::IntermediateMaterial)
            },
            &[(ids::BEEF, 1), (ids::SALT, 1)],
            &[(ids::WORKBENCH, 1)],
            2,
        ),
        recipe(
            ItemData {
                result_amount: 2,
                ..ItemData::basic(ids::BRICK, "Brick", ItemCategory::IntermediateMaterial)
            },
            &[(ids::CLAY, 2)],
            &[],
            1,
        ),
        recipe(
            ItemData::basic(ids::WORKBENCH, "Workbench", ItemCategory::Facility),
            &[(ids::WOOD, 4)],
            &[],
            1,
        ),
    ]
}

/// Every species of the default catalog.
pub fn default_species() -> Vec<LivestockData> {
    vec![
        LivestockData {
            id: ids::CHICKEN,
            name: "Chicken".to_owned(),
            description: "Lays an egg every few seconds.".to_owned(),
            meat_item: ids::CHICKEN_MEAT,
            product_item: Some(ids::EGG),
            product_interval: 8.0,
            required_level: level(1),
            color: [240, 236, 220],
        },
        LivestockData {
            id: ids::PIG,
            name: "Pig".to_owned(),
            description: "Raised for meat only.".to_owned(),
            meat_item: ids::PORK,
            product_item: None,
            product_interval: 0.0,
            required_level: level(1),
            color: [232, 170, 170],
        },
        LivestockData {
            id: ids::COW,
            name: "Cow".to_owned(),
            description: "Gives milk once mature.".to_owned(),
            meat_item: ids::BEEF,
            product_item: Some(ids::MILK),
            product_interval: 20.0,
            required_level: level(2),
            color: [90, 62, 40],
        },
        LivestockData {
            id: ids::SHEEP,
            name: "Sheep".to_owned(),
            description: "Grows a fleece between shearings.".to_owned(),
            meat_item: ids::MUTTON,
            product_item: Some(ids::WOOL),
            product_interval: 15.0,
            required_level: level(2),
            color: [226, 226, 214],
        },
    ]
}

/// The complete built-in catalog.
pub fn builtin_catalog() -> Catalog {
    let items: BTreeMap<ItemId, ItemData> =
        default_items().into_iter().map(|i| (i.id, i)).collect();
    let livestock: BTreeMap<LivestockId, LivestockData> =
        default_species().into_iter().map(|s| (s.id, s)).collect();
    Catalog::new(items, livestock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_contains_critical_items() {
        let catalog = builtin_catalog();
        for id in CRITICAL_ITEMS {
            assert!(catalog.item(id).is_some(), "missing critical item {id}");
        }
    }

    #[test]
    fn every_tool_class_is_covered() {
        let catalog = builtin_catalog();
        for class in [
            TerrainToolClass::Hoe,
            TerrainToolClass::DrainageShovel,
            TerrainToolClass::Leveler,
        ] {
            assert!(catalog.tools_of_class(class).next().is_some(), "no tool for {class:?}");
        }
    }

    #[test]
    fn recipe_inputs_reference_known_items() {
        let catalog = builtin_catalog();
        for item in catalog.items() {
            for input in item.materials.keys().chain(item.requirements.keys()) {
                assert!(catalog.item(*input).is_some(), "{} uses unknown {input}", item.name);
            }
        }
    }

    #[test]
    fn species_products_reference_known_items() {
        let catalog = builtin_catalog();
        for species in catalog.all_species() {
            assert!(catalog.item(species.meat_item).is_some());
            if let Some(product) = species.product_item {
                assert!(catalog.item(product).is_some());
            }
        }
    }
}
