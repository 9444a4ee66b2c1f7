//! Farm plot state tracking: planting, growth timers, and harvest.
//!
//! A plot moves through `EMPTY -> STAGE0 -> STAGE1 -> STAGE2 -> HARVESTABLE`
//! and back to `EMPTY` on harvest. Growth is driven by accumulated seconds;
//! stage thresholds are checked from the highest down, so one large time
//! step still lands on the correct final stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use homestead_economy::{CommandError, Inventory};
use homestead_types::{ItemId, TileCoord};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Stage a plot must reach before it can be harvested.
pub const HARVESTABLE_STAGE: u8 = 3;

/// Default seconds after planting at which stages 1, 2 and 3 are reached.
pub const DEFAULT_CROP_STAGE_SECONDS: [f32; 3] = [3.0, 6.0, 10.0];

/// Crop units granted per harvest.
pub const HARVEST_YIELD: u32 = 1;

// ---------------------------------------------------------------------------
// FarmPlot
// ---------------------------------------------------------------------------

/// Growth state of a single farm plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FarmPlot {
    /// The plot's tile.
    pub coord: TileCoord,
    /// Whether a seed is planted.
    pub has_seed: bool,
    /// Current stage, `0..=3`.
    pub growth_stage: u8,
    /// Seconds since planting.
    pub growth_timer: f32,
}

impl FarmPlot {
    /// An empty plot at `coord`.
    pub const fn empty(coord: TileCoord) -> Self {
        Self {
            coord,
            has_seed: false,
            growth_stage: 0,
            growth_timer: 0.0,
        }
    }

    /// Whether the crop is ready.
    pub const fn is_harvestable(&self) -> bool {
        self.has_seed && self.growth_stage >= HARVESTABLE_STAGE
    }
}

/// Stage reached after `timer` seconds, highest threshold first.
fn stage_for(timer: f32, thresholds: &[f32; 3]) -> u8 {
    let [first, second, third] = *thresholds;
    if timer >= third {
        3
    } else if timer >= second {
        2
    } else if timer >= first {
        1
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// FarmRegistry
// ---------------------------------------------------------------------------

/// Registry of farm plots keyed by tile.
///
/// A plot record is created on the first planting and reset to empty on
/// harvest, so it stays addressable for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmRegistry {
    plots: BTreeMap<TileCoord, FarmPlot>,
    stage_seconds: [f32; 3],
}

impl Default for FarmRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CROP_STAGE_SECONDS)
    }
}

impl FarmRegistry {
    /// Create an empty registry with the given stage thresholds.
    pub const fn new(stage_seconds: [f32; 3]) -> Self {
        Self {
            plots: BTreeMap::new(),
            stage_seconds,
        }
    }

    /// Rebuild a registry from persisted plots.
    pub fn from_plots(plots: impl IntoIterator<Item = FarmPlot>, stage_seconds: [f32; 3]) -> Self {
        Self {
            plots: plots.into_iter().map(|plot| (plot.coord, plot)).collect(),
            stage_seconds,
        }
    }

    /// Plant a seed at `coord`, consuming one `seed_item`.
    ///
    /// # Errors
    ///
    /// - [`CommandError::InvalidState`] if the plot already has a seed
    /// - [`CommandError::InsufficientResource`] if no seed is held
    pub fn plant(
        &mut self,
        coord: TileCoord,
        inventory: &mut Inventory,
        seed_item: ItemId,
    ) -> Result<(), CommandError> {
        if self.plots.get(&coord).is_some_and(|plot| plot.has_seed) {
            return Err(CommandError::invalid_state(format!(
                "plot at {coord} is already planted"
            )));
        }
        inventory.remove(seed_item, 1)?;

        self.plots.insert(
            coord,
            FarmPlot {
                has_seed: true,
                ..FarmPlot::empty(coord)
            },
        );
        debug!(%coord, "Planted seed");
        Ok(())
    }

    /// Advance every planted plot by `dt` seconds.
    ///
    /// Returns the number of plots that became harvestable during this
    /// update.
    pub fn update(&mut self, dt: f32) -> usize {
        let mut ripened: usize = 0;
        for plot in self.plots.values_mut() {
            if !plot.has_seed || plot.growth_stage >= HARVESTABLE_STAGE {
                continue;
            }
            plot.growth_timer += dt;
            let stage = stage_for(plot.growth_timer, &self.stage_seconds);
            if stage > plot.growth_stage {
                plot.growth_stage = stage;
                if stage >= HARVESTABLE_STAGE {
                    ripened = ripened.saturating_add(1);
                }
            }
        }
        ripened
    }

    /// Harvest a ripe plot, crediting one `crop_item` and resetting the
    /// plot to empty.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidState`] unless the plot is
    /// harvestable, or [`CommandError::ArithmeticOverflow`] if the crop
    /// count would overflow.
    pub fn harvest(
        &mut self,
        coord: TileCoord,
        inventory: &mut Inventory,
        crop_item: ItemId,
    ) -> Result<u32, CommandError> {
        let plot = self
            .plots
            .get_mut(&coord)
            .filter(|plot| plot.is_harvestable())
            .ok_or_else(|| CommandError::invalid_state(format!("no ripe crop at {coord}")))?;

        inventory.add(crop_item, HARVEST_YIELD)?;
        *plot = FarmPlot::empty(coord);
        debug!(%coord, "Harvested crop");
        Ok(HARVEST_YIELD)
    }

    /// Look up a plot.
    pub fn plot(&self, coord: TileCoord) -> Option<&FarmPlot> {
        self.plots.get(&coord)
    }

    /// Whether any plot record exists at `coord`.
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.plots.contains_key(&coord)
    }

    /// Number of plots ready to harvest.
    pub fn harvestable_count(&self) -> usize {
        self.plots.values().filter(|plot| plot.is_harvestable()).count()
    }

    /// Every plot in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = &FarmPlot> {
        self.plots.values()
    }

    /// Number of plot records.
    pub fn len(&self) -> usize {
        self.plots.len()
    }

    /// Whether the registry has no plots.
    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: ItemId = ItemId::new(3);
    const CROP: ItemId = ItemId::new(4);

    fn seeded(amount: u32) -> Inventory {
        let mut inv = Inventory::new();
        let _ = inv.add(SEED, amount);
        inv
    }

    #[test]
    fn full_lifecycle() {
        let mut reg = FarmRegistry::default();
        let mut inv = seeded(1);
        let coord = TileCoord::new(5, 5);

        assert!(reg.plant(coord, &mut inv, SEED).is_ok());
        assert_eq!(inv.count(SEED), 0);
        assert_eq!(reg.plot(coord).map(|p| p.growth_stage), Some(0));

        assert_eq!(reg.update(10.0), 1);
        assert!(reg.plot(coord).is_some_and(FarmPlot::is_harvestable));
        assert_eq!(reg.plot(coord).map(|p| p.growth_stage), Some(3));

        assert_eq!(reg.harvest(coord, &mut inv, CROP), Ok(1));
        assert_eq!(inv.count(CROP), 1);
        let plot = reg.plot(coord).copied().unwrap_or(FarmPlot::empty(coord));
        assert!(!plot.has_seed);
        assert_eq!(plot.growth_stage, 0);
    }

    #[test]
    fn stages_advance_incrementally() {
        let mut reg = FarmRegistry::default();
        let mut inv = seeded(1);
        let coord = TileCoord::new(0, 0);
        assert!(reg.plant(coord, &mut inv, SEED).is_ok());

        let mut stages = Vec::new();
        for _ in 0..6 {
            reg.update(2.0);
            stages.push(reg.plot(coord).map_or(0, |p| p.growth_stage));
        }
        // t = 2, 4, 6, 8, 10, 12
        assert_eq!(stages, vec![0, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn cannot_plant_twice_or_without_seed() {
        let mut reg = FarmRegistry::default();
        let mut inv = seeded(2);
        let coord = TileCoord::new(1, 1);
        assert!(reg.plant(coord, &mut inv, SEED).is_ok());
        assert!(matches!(
            reg.plant(coord, &mut inv, SEED),
            Err(CommandError::InvalidState { .. })
        ));
        assert_eq!(inv.count(SEED), 1);

        let mut empty = Inventory::new();
        assert!(matches!(
            reg.plant(TileCoord::new(2, 2), &mut empty, SEED),
            Err(CommandError::InsufficientResource { .. })
        ));
        assert!(!reg.contains(TileCoord::new(2, 2)));
    }

    #[test]
    fn unripe_harvest_fails_without_side_effects() {
        let mut reg = FarmRegistry::default();
        let mut inv = seeded(1);
        let coord = TileCoord::new(3, 3);
        assert!(reg.plant(coord, &mut inv, SEED).is_ok());
        reg.update(9.9);
        assert!(reg.harvest(coord, &mut inv, CROP).is_err());
        assert_eq!(inv.count(CROP), 0);
        assert_eq!(reg.plot(coord).map(|p| p.growth_stage), Some(2));
    }

    #[test]
    fn replanting_an_empty_plot_works() {
        let mut reg = FarmRegistry::default();
        let mut inv = seeded(2);
        let coord = TileCoord::new(-4, 7);
        assert!(reg.plant(coord, &mut inv, SEED).is_ok());
        reg.update(10.0);
        assert!(reg.harvest(coord, &mut inv, CROP).is_ok());
        assert!(reg.plant(coord, &mut inv, SEED).is_ok());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.harvestable_count(), 0);
    }
}
