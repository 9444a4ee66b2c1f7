//! Resource economy for the homestead simulation.
//!
//! This crate owns everything about items: the read-only catalogs, the
//! player's inventory ledger, recipe execution, and preserved-food routing.
//! It depends only on `homestead-types` and is consumed by the world and
//! core crates, which receive the catalog as an injected `Arc<Catalog>`.
//!
//! # Modules
//!
//! - [`catalog`] -- Item and livestock definitions ([`Catalog`], [`ItemData`], [`LivestockData`])
//! - [`crafting`] -- Validate-then-commit recipe execution ([`CraftingSystem`])
//! - [`defaults`] -- Built-in catalog used when the catalog file is missing or incomplete
//! - [`error`] -- Command and catalog errors ([`CommandError`], [`CatalogError`])
//! - [`inventory`] -- Non-negative item ledger ([`Inventory`])
//! - [`loader`] -- Row-tolerant YAML catalog loading ([`LoadReport`])
//! - [`preserved`] -- Preserved-food classification and store ([`PreservedFoodStore`])

pub mod catalog;
pub mod crafting;
pub mod defaults;
pub mod error;
pub mod inventory;
pub mod loader;
pub mod preserved;

// Re-export primary types at crate root for convenience.
pub use catalog::{Catalog, ItemData, LivestockData};
pub use crafting::{CraftDestination, CraftOutcome, CraftingSystem};
pub use defaults::builtin_catalog;
pub use error::{CatalogError, CommandError};
pub use inventory::Inventory;
pub use loader::{LoadReport, load_or_builtin, parse_catalog};
pub use preserved::{PRESERVATION_KEYWORDS, PreservedFoodStore, looks_preserved};
