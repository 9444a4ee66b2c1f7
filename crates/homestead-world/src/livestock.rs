//! Livestock pens: placement, growth, periodic products, and slaughter.
//!
//! A placed animal grows through stages 0 and 1 to maturity (stage 2).
//! Once mature it runs a production loop: a timer accumulates until it
//! reaches the species' product interval, the pen's single product slot is
//! filled, and the timer restarts. The slot holds at most one product, so
//! cycles that complete while it is full are lost.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use homestead_economy::{Catalog, CommandError, Inventory, LivestockData};
use homestead_types::{ItemId, LivestockId, TileCoord};

/// Growth stage at which an animal is mature and starts producing.
pub const MATURE_STAGE: u8 = 2;

/// Default seconds after placement at which stages 1 and 2 are reached.
pub const DEFAULT_LIVESTOCK_STAGE_SECONDS: [f32; 2] = [5.0, 10.0];

/// One occupied pen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LivestockPen {
    /// The pen's tile.
    pub coord: TileCoord,
    /// The animal's species.
    pub species: LivestockId,
    /// Current stage, `0..=2`.
    pub growth_stage: u8,
    /// Seconds since placement, until maturity.
    pub growth_timer: f32,
    /// Seconds since the last product, once mature.
    pub product_timer: f32,
    /// Whether a product is waiting to be collected.
    pub has_product: bool,
}

impl LivestockPen {
    /// A freshly placed animal.
    pub const fn new(coord: TileCoord, species: LivestockId) -> Self {
        Self {
            coord,
            species,
            growth_stage: 0,
            growth_timer: 0.0,
            product_timer: 0.0,
            has_product: false,
        }
    }

    /// Whether the animal has reached maturity.
    pub const fn is_mature(&self) -> bool {
        self.growth_stage >= MATURE_STAGE
    }
}

/// Registry of occupied pens keyed by tile.
///
/// Killing an animal removes its pen, so a coordinate holds a pen exactly
/// while an animal lives there.
#[derive(Debug, Clone)]
pub struct PenRegistry {
    catalog: Arc<Catalog>,
    pens: BTreeMap<TileCoord, LivestockPen>,
    stage_seconds: [f32; 2],
}

impl PenRegistry {
    /// Create an empty registry.
    pub const fn new(catalog: Arc<Catalog>, stage_seconds: [f32; 2]) -> Self {
        Self {
            catalog,
            pens: BTreeMap::new(),
            stage_seconds,
        }
    }

    /// Rebuild a registry from persisted pens.
    ///
    /// # Errors
    ///
    /// Returns the first species id not present in the catalog.
    pub fn from_pens(
        catalog: Arc<Catalog>,
        pens: impl IntoIterator<Item = LivestockPen>,
        stage_seconds: [f32; 2],
    ) -> Result<Self, LivestockId> {
        let mut map = BTreeMap::new();
        for pen in pens {
            if catalog.species(pen.species).is_none() {
                return Err(pen.species);
            }
            map.insert(pen.coord, pen);
        }
        Ok(Self {
            catalog,
            pens: map,
            stage_seconds,
        })
    }

    fn species_of(&self, pen: &LivestockPen) -> Result<&LivestockData, CommandError> {
        self.catalog.species(pen.species).ok_or_else(|| {
            CommandError::invalid_state(format!("unknown species {} in pen", pen.species))
        })
    }

    /// Place an animal of `species` at `coord`, consuming one `feed_item`.
    ///
    /// # Errors
    ///
    /// - [`CommandError::InvalidState`] if the pen is occupied or the
    ///   species is unknown
    /// - [`CommandError::InsufficientResource`] if no feed is held
    pub fn place_animal(
        &mut self,
        coord: TileCoord,
        species: LivestockId,
        inventory: &mut Inventory,
        feed_item: ItemId,
    ) -> Result<(), CommandError> {
        if self.pens.contains_key(&coord) {
            return Err(CommandError::invalid_state(format!(
                "pen at {coord} is occupied"
            )));
        }
        if self.catalog.species(species).is_none() {
            return Err(CommandError::invalid_state(format!(
                "unknown species {species}"
            )));
        }
        inventory.remove(feed_item, 1)?;

        self.pens.insert(coord, LivestockPen::new(coord, species));
        debug!(%coord, %species, "Placed animal");
        Ok(())
    }

    /// Advance every pen by `dt` seconds.
    ///
    /// Immature animals grow; mature animals of producing species run the
    /// production timer. An animal that matures partway through `dt` spends
    /// the rest of it on its first product. Returns the number of pens whose product slot was
    /// filled during this update.
    pub fn update(&mut self, dt: f32) -> usize {
        let [first, second] = self.stage_seconds;
        let mut produced: usize = 0;

        for pen in self.pens.values_mut() {
            let mut remaining = dt;
            if !pen.is_mature() {
                pen.growth_timer += dt;
                let stage = if pen.growth_timer >= second {
                    2
                } else if pen.growth_timer >= first {
                    1
                } else {
                    0
                };
                pen.growth_stage = pen.growth_stage.max(stage);
                if !pen.is_mature() {
                    continue;
                }
                // Time past maturity counts toward the first product.
                remaining = (pen.growth_timer - second).clamp(0.0, dt);
            }

            let Some(interval) = self
                .catalog
                .species(pen.species)
                .filter(|s| s.product_item.is_some())
                .map(|s| s.product_interval)
            else {
                continue;
            };

            pen.product_timer += remaining;
            if pen.product_timer >= interval {
                pen.product_timer = 0.0;
                if !pen.has_product {
                    pen.has_product = true;
                    produced = produced.saturating_add(1);
                }
            }
        }
        produced
    }

    /// Collect the waiting product, crediting the species' product item.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidState`] if there is no animal, the
    /// species has no product, or no product is waiting.
    pub fn harvest_product(
        &mut self,
        coord: TileCoord,
        inventory: &mut Inventory,
    ) -> Result<ItemId, CommandError> {
        let pen = self
            .pens
            .get(&coord)
            .ok_or_else(|| CommandError::invalid_state(format!("no animal at {coord}")))?;
        let product = self.species_of(pen)?.product_item.ok_or_else(|| {
            CommandError::invalid_state(format!("species {} has no product", pen.species))
        })?;
        if !pen.has_product {
            return Err(CommandError::invalid_state(format!(
                "no product waiting at {coord}"
            )));
        }

        inventory.add(product, 1)?;
        if let Some(pen) = self.pens.get_mut(&coord) {
            pen.has_product = false;
        }
        debug!(%coord, item = %product, "Collected animal product");
        Ok(product)
    }

    /// Slaughter the animal at `coord`, crediting its meat and clearing the
    /// pen. Valid at any growth stage.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidState`] if there is no animal.
    pub fn kill_animal(
        &mut self,
        coord: TileCoord,
        inventory: &mut Inventory,
    ) -> Result<ItemId, CommandError> {
        let pen = self
            .pens
            .get(&coord)
            .ok_or_else(|| CommandError::invalid_state(format!("no animal at {coord}")))?;
        let meat = self.species_of(pen)?.meat_item;

        inventory.add(meat, 1)?;
        self.pens.remove(&coord);
        debug!(%coord, item = %meat, "Killed animal");
        Ok(meat)
    }

    /// Look up a pen.
    pub fn pen(&self, coord: TileCoord) -> Option<&LivestockPen> {
        self.pens.get(&coord)
    }

    /// Whether an animal lives at `coord`.
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.pens.contains_key(&coord)
    }

    /// Number of mature animals.
    pub fn mature_count(&self) -> usize {
        self.pens.values().filter(|pen| pen.is_mature()).count()
    }

    /// Every pen in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = &LivestockPen> {
        self.pens.values()
    }

    /// Number of occupied pens.
    pub fn len(&self) -> usize {
        self.pens.len()
    }

    /// Whether no pen is occupied.
    pub fn is_empty(&self) -> bool {
        self.pens.is_empty()
    }
}
