//! Recipe validation and execution.
//!
//! [`CraftingSystem`] reads recipes from the shared [`Catalog`] and applies
//! them to an [`Inventory`] with a validate-then-commit discipline: a craft
//! either deducts every material and credits the result, or leaves the
//! inventory exactly as it was.
//!
//! Materials are consumed; requirements (tools, facilities) only need to be
//! held. Output of preserved-food recipes is routed into the
//! [`PreservedFoodStore`] instead of the inventory.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use homestead_types::{CivilizationLevel, ItemId};

use crate::catalog::{Catalog, ItemData};
use crate::error::CommandError;
use crate::inventory::Inventory;
use crate::preserved::PreservedFoodStore;

// ---------------------------------------------------------------------------
// CraftOutcome
// ---------------------------------------------------------------------------

/// Where a successful craft delivered its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CraftDestination {
    /// Credited to the inventory.
    Inventory,
    /// Credited to the preserved-food store.
    PreservedStore,
}

/// Result of a successful craft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CraftOutcome {
    /// The crafted item.
    pub item: ItemId,
    /// Units produced.
    pub amount: u32,
    /// Where the units went.
    pub destination: CraftDestination,
}

// ---------------------------------------------------------------------------
// CraftingSystem
// ---------------------------------------------------------------------------

/// Applies catalog recipes to an inventory.
#[derive(Debug, Clone)]
pub struct CraftingSystem {
    catalog: Arc<Catalog>,
}

impl CraftingSystem {
    /// Create a crafting system over a shared catalog.
    pub const fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// The catalog recipes are read from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether `inventory` covers every material in full and holds at least
    /// one of every requirement. Unknown or non-craftable items are never
    /// craftable.
    pub fn can_craft(&self, inventory: &Inventory, item: ItemId) -> bool {
        self.catalog
            .item(item)
            .filter(|data| data.craftable)
            .is_some_and(|data| covers(inventory, data))
    }

    /// Shortfalls for a recipe: item id to the quantity still needed.
    /// Empty when the recipe can be crafted or is unknown.
    pub fn missing_materials(&self, inventory: &Inventory, item: ItemId) -> BTreeMap<ItemId, u32> {
        let Some(data) = self.catalog.item(item) else {
            return BTreeMap::new();
        };
        let consumed = data
            .materials
            .iter()
            .map(|(&input, &amount)| (input, amount));
        let held = data.requirements.keys().map(|&input| (input, 1));

        consumed
            .chain(held)
            .filter_map(|(input, amount)| {
                let short = amount.saturating_sub(inventory.count(input));
                (short > 0).then_some((input, short))
            })
            .collect()
    }

    /// Craftable items unlocked at `level`, in id order.
    pub fn available_recipes(&self, level: CivilizationLevel) -> Vec<&ItemData> {
        self.catalog
            .items()
            .filter(|item| item.craftable && level.is_item_available(item.required_level))
            .collect()
    }

    /// Craft one batch of `item`.
    ///
    /// Checks, in order: the item exists, it has a recipe, the recipe is
    /// unlocked at `level`, and the inventory covers it. Then deducts every
    /// material and credits `result_amount` units, either to the inventory
    /// or, for preserved food, to `store`.
    ///
    /// # Errors
    ///
    /// - [`CommandError::UnknownItem`] / [`CommandError::NotCraftable`]
    /// - [`CommandError::NotUnlocked`] when the recipe level is above `level`
    /// - [`CommandError::InsufficientResource`] for the first shortfall
    /// - [`CommandError::ArithmeticOverflow`] if the output would overflow
    ///
    /// Neither `inventory` nor `store` is modified on error.
    pub fn craft(
        &self,
        inventory: &mut Inventory,
        store: &mut PreservedFoodStore,
        item: ItemId,
        level: CivilizationLevel,
    ) -> Result<CraftOutcome, CommandError> {
        let data = self
            .catalog
            .item(item)
            .ok_or(CommandError::UnknownItem(item))?;
        if !data.craftable {
            return Err(CommandError::NotCraftable(item));
        }
        if !level.is_item_available(data.required_level) {
            return Err(CommandError::NotUnlocked {
                required: data.required_level,
                current: level,
            });
        }
        if let Some((&short_item, &requested)) = self.missing_materials(inventory, item).iter().next()
        {
            return Err(CommandError::InsufficientResource {
                item: short_item,
                requested,
                available: inventory.count(short_item),
            });
        }

        let outcome = if data.preserved {
            // Stage the store credit first so an overflow there aborts
            // before the inventory is touched.
            let mut staged = store.clone();
            staged.add(item, data.result_amount)?;
            inventory.exchange(&data.materials, &[])?;
            *store = staged;
            CraftOutcome {
                item,
                amount: data.result_amount,
                destination: CraftDestination::PreservedStore,
            }
        } else {
            inventory.exchange(&data.materials, &[(item, data.result_amount)])?;
            CraftOutcome {
                item,
                amount: data.result_amount,
                destination: CraftDestination::Inventory,
            }
        };

        debug!(
            item = %item,
            name = %data.name,
            amount = outcome.amount,
            destination = ?outcome.destination,
            "Crafted"
        );
        Ok(outcome)
    }
}

fn covers(inventory: &Inventory, data: &ItemData) -> bool {
    inventory.has_all(&data.materials)
        && data.requirements.keys().all(|&held| inventory.has(held, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{builtin_catalog, ids};

    fn system() -> CraftingSystem {
        CraftingSystem::new(Arc::new(builtin_catalog()))
    }

    fn level(raw: u8) -> CivilizationLevel {
        CivilizationLevel::new(raw).unwrap_or_default()
    }

    fn inventory(entries: &[(ItemId, u32)]) -> Inventory {
        Inventory::from_map(entries.iter().copied().collect())
    }

    #[test]
    fn short_materials_fail_without_mutation() {
        let crafting = system();
        let mut inv = inventory(&[(ids::WOOD, 1)]);
        let mut store = PreservedFoodStore::new();
        let before = inv.clone();

        assert!(!crafting.can_craft(&inv, ids::STONE_HOE));
        let result = crafting.craft(&mut inv, &mut store, ids::STONE_HOE, level(1));
        assert!(matches!(
            result,
            Err(CommandError::InsufficientResource { .. })
        ));
        assert_eq!(inv, before);
    }

    #[test]
    fn craft_deducts_materials_and_credits_result() {
        let crafting = system();
        let mut inv = inventory(&[(ids::WOOD, 3), (ids::STONE, 1)]);
        let mut store = PreservedFoodStore::new();

        let outcome = crafting.craft(&mut inv, &mut store, ids::STONE_HOE, level(1));
        assert!(outcome.is_ok());
        assert_eq!(inv.count(ids::WOOD), 1);
        assert_eq!(inv.count(ids::STONE), 0);
        assert_eq!(inv.count(ids::STONE_HOE), 1);
    }

    #[test]
    fn result_amount_is_honored() {
        let crafting = system();
        let mut inv = inventory(&[(ids::CLAY, 2)]);
        let mut store = PreservedFoodStore::new();
        assert!(crafting.craft(&mut inv, &mut store, ids::BRICK, level(1)).is_ok());
        assert_eq!(inv.count(ids::BRICK), 2);
    }

    #[test]
    fn requirements_are_held_not_consumed() {
        let crafting = system();
        let mut inv = inventory(&[(ids::WOOD, 2), (ids::STONE, 3)]);
        let mut store = PreservedFoodStore::new();
        assert!(!crafting.can_craft(&inv, ids::IRON_HOE));
        assert_eq!(
            crafting.missing_materials(&inv, ids::IRON_HOE),
            BTreeMap::from([(ids::WORKBENCH, 1)])
        );

        assert!(inv.add(ids::WORKBENCH, 1).is_ok());
        assert!(crafting.craft(&mut inv, &mut store, ids::IRON_HOE, level(2)).is_ok());
        assert_eq!(inv.count(ids::WORKBENCH), 1);
        assert_eq!(inv.count(ids::IRON_HOE), 1);
    }

    #[test]
    fn level_gate_comes_before_material_check() {
        let crafting = system();
        let mut inv = Inventory::new();
        let mut store = PreservedFoodStore::new();
        let result = crafting.craft(&mut inv, &mut store, ids::LEVELER, level(1));
        assert!(matches!(result, Err(CommandError::NotUnlocked { .. })));
    }

    #[test]
    fn preserved_output_goes_to_store() {
        let crafting = system();
        let mut inv = inventory(&[(ids::WHEAT, 2), (ids::SALT, 1)]);
        let mut store = PreservedFoodStore::new();

        let outcome = crafting.craft(&mut inv, &mut store, ids::PICKLED_VEGETABLES, level(1));
        assert_eq!(
            outcome.map(|o| o.destination),
            Ok(CraftDestination::PreservedStore)
        );
        assert_eq!(inv.count(ids::PICKLED_VEGETABLES), 0);
        assert_eq!(store.quantity(ids::PICKLED_VEGETABLES), 1);
        assert!(inv.is_empty());
    }

    #[test]
    fn non_recipes_are_rejected() {
        let crafting = system();
        let mut inv = Inventory::new();
        let mut store = PreservedFoodStore::new();
        assert_eq!(
            crafting.craft(&mut inv, &mut store, ids::WOOD, level(1)),
            Err(CommandError::NotCraftable(ids::WOOD))
        );
        assert_eq!(
            crafting.craft(&mut inv, &mut store, ItemId::new(9999), level(1)),
            Err(CommandError::UnknownItem(ItemId::new(9999)))
        );
    }

    #[test]
    fn available_recipes_grow_with_level() {
        let crafting = system();
        let at_one = crafting.available_recipes(level(1)).len();
        let at_two = crafting.available_recipes(level(2)).len();
        assert!(at_one > 0);
        assert!(at_two > at_one);
    }
}
