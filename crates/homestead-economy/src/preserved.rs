//! Preserved-food classification and store.
//!
//! Crafted preserved food does not land in the inventory. It is routed into
//! a separate [`PreservedFoodStore`] whose holdings gate the first
//! civilization transition.
//!
//! An item counts as preserved food when its catalog row says so explicitly,
//! or, for rows without the flag, when it is an intermediate material whose
//! name contains one of [`PRESERVATION_KEYWORDS`].

use std::collections::BTreeMap;

use homestead_types::{ItemCategory, ItemId};

use crate::error::CommandError;

/// Lower-case name fragments that mark an intermediate material as
/// preserved food.
pub const PRESERVATION_KEYWORDS: [&str; 7] = [
    "pickled",
    "dried",
    "salted",
    "smoked",
    "cured",
    "fermented",
    "preserved",
];

/// Name-based preserved-food heuristic for rows with no explicit flag.
pub fn looks_preserved(category: ItemCategory, name: &str) -> bool {
    if category != ItemCategory::IntermediateMaterial {
        return false;
    }
    let lower = name.to_lowercase();
    PRESERVATION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Quantities of preserved food produced by crafting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreservedFoodStore {
    stock: BTreeMap<ItemId, u32>,
}

impl PreservedFoodStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            stock: BTreeMap::new(),
        }
    }

    /// Rebuild a store from persisted quantities.
    pub fn from_map(stock: BTreeMap<ItemId, u32>) -> Self {
        Self {
            stock: stock.into_iter().filter(|&(_, qty)| qty > 0).collect(),
        }
    }

    /// Add crafted units.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::ArithmeticOverflow`] if the quantity would
    /// exceed `u32::MAX`.
    pub fn add(&mut self, item: ItemId, amount: u32) -> Result<(), CommandError> {
        if amount == 0 {
            return Ok(());
        }
        let entry = self.stock.entry(item).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| CommandError::ArithmeticOverflow {
                context: format!("preserved stock of item {item} exceeds u32"),
            })?;
        Ok(())
    }

    /// Quantity of one preserved item.
    pub fn quantity(&self, item: ItemId) -> u32 {
        self.stock.get(&item).copied().unwrap_or(0)
    }

    /// The largest holding of any single item.
    pub fn max_quantity(&self) -> u32 {
        self.stock.values().copied().max().unwrap_or(0)
    }

    /// Whether any single item's holding reaches `threshold`.
    pub fn any_at_least(&self, threshold: u32) -> bool {
        self.stock.values().any(|&qty| qty >= threshold)
    }

    /// Copy of the full quantity map.
    pub fn snapshot(&self) -> BTreeMap<ItemId, u32> {
        self.stock.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_requires_intermediate_category() {
        assert!(looks_preserved(ItemCategory::IntermediateMaterial, "Pickled Turnip"));
        assert!(looks_preserved(ItemCategory::IntermediateMaterial, "DRIED meat"));
        assert!(!looks_preserved(ItemCategory::Food, "Dried Fruit"));
        assert!(!looks_preserved(ItemCategory::IntermediateMaterial, "Brick"));
    }

    #[test]
    fn store_threshold_is_per_item() {
        let mut store = PreservedFoodStore::new();
        assert!(store.add(ItemId::new(60), 6).is_ok());
        assert!(store.add(ItemId::new(61), 6).is_ok());
        assert!(!store.any_at_least(10));
        assert!(store.add(ItemId::new(60), 4).is_ok());
        assert!(store.any_at_least(10));
        assert_eq!(store.max_quantity(), 10);
    }
}
