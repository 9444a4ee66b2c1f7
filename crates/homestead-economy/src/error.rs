//! Error types for the homestead-economy crate.
//!
//! [`CommandError`] is the failure type of every player command across the
//! workspace (plant, harvest, place, convert, build, craft). It lives here
//! because the economy is the one crate every command path depends on.
//! [`CatalogError`] covers catalog file loading.

use homestead_types::{CivilizationLevel, ItemId, RejectionReason, TerrainType, TileCoord};

/// Why a player command was rejected.
///
/// Every variant is local and recoverable: the inventory, grid, and
/// registries are left exactly as they were before the command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// The inventory holds less of an item than the command needs.
    #[error("insufficient resource: wanted {requested} of item {item} but only have {available}")]
    InsufficientResource {
        /// The missing item.
        item: ItemId,
        /// Quantity the command needed.
        requested: u32,
        /// Quantity actually held.
        available: u32,
    },

    /// The item id is not in the catalog.
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),

    /// The item exists but is not a terrain tool.
    #[error("item {0} is not a terrain tool")]
    NotATerrainTool(ItemId),

    /// The item exists but has no recipe.
    #[error("item {0} is not craftable")]
    NotCraftable(ItemId),

    /// The target is in the wrong state (occupied, already built, not ripe).
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Description of the conflicting state.
        reason: String,
    },

    /// The tile's terrain does not allow the action, or the tile has not
    /// been generated yet.
    #[error("invalid terrain at {coord}: {terrain:?}")]
    InvalidTerrain {
        /// The targeted tile.
        coord: TileCoord,
        /// Current terrain, or `None` for an ungenerated tile.
        terrain: Option<TerrainType>,
    },

    /// No qualifying tile exists within the required radius.
    #[error("no water source within {radius} tiles of {coord}")]
    AdjacencyUnmet {
        /// The targeted tile.
        coord: TileCoord,
        /// Search radius in tiles.
        radius: u32,
    },

    /// The civilization level is below the content's requirement.
    #[error("requires civilization level {required}, currently {current}")]
    NotUnlocked {
        /// Level the content requires.
        required: CivilizationLevel,
        /// Current level.
        current: CivilizationLevel,
    },

    /// A quantity would overflow its counter.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

impl CommandError {
    /// Build an [`CommandError::InvalidState`] from a description.
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    /// Classify this error into the coarse rejection categories exposed to
    /// the presentation layer.
    pub const fn reason(&self) -> RejectionReason {
        match self {
            Self::InsufficientResource { .. } | Self::UnknownItem(_) | Self::NotATerrainTool(_) => {
                RejectionReason::InsufficientResource
            }
            Self::NotCraftable(_) | Self::InvalidState { .. } | Self::ArithmeticOverflow { .. } => {
                RejectionReason::InvalidState
            }
            Self::InvalidTerrain { .. } => RejectionReason::InvalidTerrain,
            Self::AdjacencyUnmet { .. } => RejectionReason::AdjacencyUnmet,
            Self::NotUnlocked { .. } => RejectionReason::NotUnlocked,
        }
    }
}

/// Errors that can occur while reading a catalog file.
///
/// Row-level problems are never errors; they are skipped and counted in the
/// load report. Only an unreadable or unparseable document surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Failed to read the catalog file from disk.
    #[error("failed to read catalog file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The document as a whole is not valid YAML.
    #[error("failed to parse catalog YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for CatalogError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_matches_rejection_categories() {
        let missing = CommandError::InsufficientResource {
            item: ItemId::new(3),
            requested: 1,
            available: 0,
        };
        assert_eq!(missing.reason(), RejectionReason::InsufficientResource);
        assert_eq!(
            CommandError::invalid_state("occupied").reason(),
            RejectionReason::InvalidState
        );
        assert_eq!(
            CommandError::AdjacencyUnmet {
                coord: TileCoord::new(0, 0),
                radius: 3,
            }
            .reason(),
            RejectionReason::AdjacencyUnmet
        );
        assert_eq!(
            CommandError::NotUnlocked {
                required: CivilizationLevel::MAX,
                current: CivilizationLevel::MIN,
            }
            .reason(),
            RejectionReason::NotUnlocked
        );
    }

    #[test]
    fn messages_name_the_item() {
        let err = CommandError::InsufficientResource {
            item: ItemId::new(5),
            requested: 2,
            available: 1,
        };
        assert!(err.to_string().contains("item 5"));
    }
}
