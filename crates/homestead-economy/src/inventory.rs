//! The player's resource ledger.
//!
//! An [`Inventory`] maps item ids to non-negative quantities. Quantities are
//! `u32`, so a negative balance is unrepresentable; removal fails without
//! mutation when the balance is short. All arithmetic is checked -- no
//! silent overflows, no panics.

use std::collections::BTreeMap;

use homestead_types::ItemId;

use crate::error::CommandError;

/// Item id to quantity mapping. Items at zero are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: BTreeMap<ItemId, u32>,
}

impl Inventory {
    /// Create an empty inventory.
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Build an inventory from a quantity map, dropping zero entries.
    pub fn from_map(items: BTreeMap<ItemId, u32>) -> Self {
        Self {
            items: items.into_iter().filter(|&(_, qty)| qty > 0).collect(),
        }
    }

    /// Current quantity of an item (zero when absent).
    pub fn count(&self, item: ItemId) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// Whether the inventory holds at least `amount` of an item.
    pub fn has(&self, item: ItemId, amount: u32) -> bool {
        self.count(item) >= amount
    }

    /// Whether every entry in `needed` is covered.
    pub fn has_all(&self, needed: &BTreeMap<ItemId, u32>) -> bool {
        needed.iter().all(|(&item, &amount)| self.has(item, amount))
    }

    /// Add `amount` units of an item. Adding zero is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::ArithmeticOverflow`] if the quantity would
    /// exceed `u32::MAX`; the inventory is unchanged in that case.
    pub fn add(&mut self, item: ItemId, amount: u32) -> Result<(), CommandError> {
        add_to(&mut self.items, item, amount)
    }

    /// Remove `amount` units of an item.
    ///
    /// Removes the key entirely if the quantity reaches zero.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InsufficientResource`] if the balance is
    /// below `amount`; the inventory is unchanged in that case.
    pub fn remove(&mut self, item: ItemId, amount: u32) -> Result<(), CommandError> {
        remove_from(&mut self.items, item, amount)
    }

    /// Consume every entry of `consume` and then credit every entry of
    /// `produce`, as one atomic step.
    ///
    /// The whole exchange is staged on a copy of the ledger and committed
    /// only if every step succeeds, so a failure leaves the inventory
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns the first [`CommandError::InsufficientResource`] or
    /// [`CommandError::ArithmeticOverflow`] encountered.
    pub fn exchange(
        &mut self,
        consume: &BTreeMap<ItemId, u32>,
        produce: &[(ItemId, u32)],
    ) -> Result<(), CommandError> {
        let mut staged = self.items.clone();
        for (&item, &amount) in consume {
            remove_from(&mut staged, item, amount)?;
        }
        for &(item, amount) in produce {
            add_to(&mut staged, item, amount)?;
        }
        self.items = staged;
        Ok(())
    }

    /// Iterate over held items in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u32)> + '_ {
        self.items.iter().map(|(&item, &qty)| (item, qty))
    }

    /// Copy of the full quantity map for the presentation layer.
    pub fn snapshot(&self) -> BTreeMap<ItemId, u32> {
        self.items.clone()
    }

    /// Whether the inventory holds nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct items held.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

fn add_to(items: &mut BTreeMap<ItemId, u32>, item: ItemId, amount: u32) -> Result<(), CommandError> {
    if amount == 0 {
        return Ok(());
    }
    let current = items.get(&item).copied().unwrap_or(0);
    let updated = current
        .checked_add(amount)
        .ok_or_else(|| CommandError::ArithmeticOverflow {
            context: format!("quantity of item {item} exceeds u32"),
        })?;
    items.insert(item, updated);
    Ok(())
}

fn remove_from(
    items: &mut BTreeMap<ItemId, u32>,
    item: ItemId,
    amount: u32,
) -> Result<(), CommandError> {
    let current = items.get(&item).copied().unwrap_or(0);
    let remaining = current
        .checked_sub(amount)
        .ok_or(CommandError::InsufficientResource {
            item,
            requested: amount,
            available: current,
        })?;

    if remaining == 0 {
        items.remove(&item);
    } else {
        items.insert(item, remaining);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WOOD: ItemId = ItemId::new(1);
    const STONE: ItemId = ItemId::new(2);

    #[test]
    fn add_stacks() {
        let mut inv = Inventory::new();
        assert!(inv.add(WOOD, 10).is_ok());
        assert!(inv.add(WOOD, 5).is_ok());
        assert_eq!(inv.count(WOOD), 15);
    }

    #[test]
    fn add_zero_is_noop() {
        let mut inv = Inventory::new();
        assert!(inv.add(WOOD, 0).is_ok());
        assert!(inv.is_empty());
    }

    #[test]
    fn add_overflow_leaves_balance() {
        let mut inv = Inventory::new();
        assert!(inv.add(WOOD, u32::MAX).is_ok());
        assert!(inv.add(WOOD, 1).is_err());
        assert_eq!(inv.count(WOOD), u32::MAX);
    }

    #[test]
    fn remove_exact_drops_key() {
        let mut inv = Inventory::new();
        assert!(inv.add(WOOD, 10).is_ok());
        assert!(inv.remove(WOOD, 10).is_ok());
        assert_eq!(inv.count(WOOD), 0);
        assert!(inv.is_empty());
    }

    #[test]
    fn remove_insufficient_is_rejected_without_mutation() {
        let mut inv = Inventory::new();
        assert!(inv.add(WOOD, 3).is_ok());
        let result = inv.remove(WOOD, 5);
        assert_eq!(
            result,
            Err(CommandError::InsufficientResource {
                item: WOOD,
                requested: 5,
                available: 3,
            })
        );
        assert_eq!(inv.count(WOOD), 3);
    }

    #[test]
    fn balance_never_goes_negative_over_a_sequence() {
        let mut inv = Inventory::new();
        let ops: [(bool, u32); 8] = [
            (true, 4),
            (false, 3),
            (false, 2),
            (true, 1),
            (false, 2),
            (false, 1),
            (true, 7),
            (false, 8),
        ];
        let mut expected: u32 = 0;
        for (is_add, amount) in ops {
            if is_add {
                assert!(inv.add(STONE, amount).is_ok());
                expected = expected.saturating_add(amount);
            } else if inv.remove(STONE, amount).is_ok() {
                expected = expected.saturating_sub(amount);
            }
            assert_eq!(inv.count(STONE), expected);
        }
    }

    #[test]
    fn exchange_is_all_or_nothing() {
        let mut inv = Inventory::new();
        assert!(inv.add(WOOD, 1).is_ok());
        let before = inv.clone();

        let consume = BTreeMap::from([(WOOD, 2), (STONE, 1)]);
        assert!(inv.exchange(&consume, &[(ItemId::new(9), 1)]).is_err());
        assert_eq!(inv, before);

        assert!(inv.add(WOOD, 1).is_ok());
        assert!(inv.add(STONE, 1).is_ok());
        assert!(inv.exchange(&consume, &[(ItemId::new(9), 1)]).is_ok());
        assert_eq!(inv.count(WOOD), 0);
        assert_eq!(inv.count(STONE), 0);
        assert_eq!(inv.count(ItemId::new(9)), 1);
    }

    #[test]
    fn from_map_drops_zero_entries() {
        let inv = Inventory::from_map(BTreeMap::from([(WOOD, 0), (STONE, 2)]));
        assert_eq!(inv.len(), 1);
        assert!(inv.has(STONE, 2));
    }
}
