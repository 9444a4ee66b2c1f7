//! Type-safe identifier wrappers around catalog row ids.
//!
//! Catalog files key items and livestock species by plain integers. Each
//! kind of id gets its own newtype so an item id can never be passed where a
//! species id is expected. Ids are assigned by the catalog author, never
//! generated at runtime.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around an `i32` catalog id with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub i32);

        impl $name {
            /// Wrap a raw catalog id.
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            /// Return the raw catalog id.
            pub const fn into_inner(self) -> i32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of an item row in the item catalog.
    ItemId
}

define_id! {
    /// Identifier of a species row in the livestock catalog.
    LivestockId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&ItemId::new(31)).ok();
        assert_eq!(json.as_deref(), Some("31"));
    }

    #[test]
    fn id_display_matches_raw() {
        assert_eq!(LivestockId::new(-4).to_string(), "-4");
        assert_eq!(i32::from(ItemId::from(7)), 7);
    }
}
