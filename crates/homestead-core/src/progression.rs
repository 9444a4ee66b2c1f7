//! Civilization level progression.
//!
//! The level is a monotonic counter. Each call to
//! [`ProgressionGate::check_progress`] evaluates only the transition out of
//! the current level and advances by at most one step:
//!
//! | Transition | Condition                                                  |
//! |------------|------------------------------------------------------------|
//! | 1 -> 2     | one preserved-food item held at `preserved_food_threshold` |
//! | 2 -> 3     | lifetime livestock products >= `product_threshold_a`       |
//! | 3 -> 4     | lifetime livestock products >= `product_threshold_b`       |
//!
//! Levels above 4 have no transition and are never reached.

use core::fmt;

use tracing::info;

use homestead_economy::PreservedFoodStore;
use homestead_types::CivilizationLevel;

use crate::config::ProgressionConfig;

/// Counters aggregated from the economy and production registries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressionAggregates {
    /// Largest preserved-food holding of any single item.
    pub preserved_food: u32,
    /// Livestock products collected over the world's lifetime.
    pub lifetime_products: u64,
    /// Temples standing.
    pub temple_count: usize,
}

impl ProgressionAggregates {
    /// Build aggregates from the live stores.
    pub fn collect(store: &PreservedFoodStore, lifetime_products: u64, temple_count: usize) -> Self {
        Self {
            preserved_food: store.max_quantity(),
            lifetime_products,
            temple_count,
        }
    }
}

/// What the pending transition needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Hold this much of a single preserved-food item.
    PreservedFood {
        /// Quantity required.
        threshold: u32,
    },
    /// Collect this many livestock products in total.
    LivestockProducts {
        /// Lifetime product count required.
        threshold: u64,
    },
}

impl Requirement {
    /// Whether the aggregates satisfy this requirement.
    pub const fn is_met(self, aggregates: &ProgressionAggregates) -> bool {
        match self {
            Self::PreservedFood { threshold } => aggregates.preserved_food >= threshold,
            Self::LivestockProducts { threshold } => aggregates.lifetime_products >= threshold,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreservedFood { threshold } => {
                write!(f, "store {threshold} of a single preserved food")
            }
            Self::LivestockProducts { threshold } => {
                write!(f, "collect {threshold} livestock products in total")
            }
        }
    }
}

/// Monotonic civilization level with its transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionGate {
    level: CivilizationLevel,
    thresholds: ProgressionConfig,
}

impl ProgressionGate {
    /// A gate at level 1.
    pub const fn new(thresholds: ProgressionConfig) -> Self {
        Self {
            level: CivilizationLevel::MIN,
            thresholds,
        }
    }

    /// A gate restored at a persisted level.
    pub const fn at_level(level: CivilizationLevel, thresholds: ProgressionConfig) -> Self {
        Self { level, thresholds }
    }

    /// Current level.
    pub const fn level(&self) -> CivilizationLevel {
        self.level
    }

    /// Display name of the current level.
    pub fn level_name(&self) -> &'static str {
        self.level.name()
    }

    /// Whether content requiring `required` is unlocked.
    pub fn is_item_available(&self, required: CivilizationLevel) -> bool {
        self.level.is_item_available(required)
    }

    /// The requirement of the transition out of the current level, or
    /// `None` at the top implemented level.
    pub const fn next_requirement(&self) -> Option<Requirement> {
        match self.level.get() {
            1 => Some(Requirement::PreservedFood {
                threshold: self.thresholds.preserved_food_threshold,
            }),
            2 => Some(Requirement::LivestockProducts {
                threshold: self.thresholds.product_threshold_a,
            }),
            3 => Some(Requirement::LivestockProducts {
                threshold: self.thresholds.product_threshold_b,
            }),
            _ => None,
        }
    }

    /// Evaluate the pending transition and advance one level if it is met.
    ///
    /// Returns the new level when the gate advanced.
    pub fn check_progress(&mut self, aggregates: &ProgressionAggregates) -> Option<CivilizationLevel> {
        let requirement = self.next_requirement()?;
        if !requirement.is_met(aggregates) {
            return None;
        }
        let next = self.level.next()?;
        info!(
            from = %self.level,
            to = %next,
            name = next.name(),
            "Civilization advanced"
        );
        self.level = next;
        Some(next)
    }

    /// Whether the ending can be offered: the top implemented level is
    /// reached and a temple stands. Read-only.
    pub const fn is_ending_available(&self, aggregates: &ProgressionAggregates) -> bool {
        self.level.get() >= self.thresholds.top_implemented_level && aggregates.temple_count >= 1
    }
}
