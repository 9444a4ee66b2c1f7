//! Data-driven terrain attribute table.
//!
//! Every subsystem that needs to know something about a terrain type
//! (generation, conversion, placement legality, the map overlay) consults
//! [`TerrainType::attributes`] instead of matching on the enum itself.
//!
//! | Terrain        | crops | livestock | build | water | protected | fixed |
//! |----------------|-------|-----------|-------|-------|-----------|-------|
//! | Grass          |       | x         |       |       |           |       |
//! | Dirt           |       | x         |       |       |           |       |
//! | Sand           |       | x         |       |       |           |       |
//! | Water          |       |           |       | x     |           | x     |
//! | Stone          |       |           | x     |       |           | x     |
//! | Forest         |       |           |       |       |           |       |
//! | Marsh          |       |           |       |       |           |       |
//! | Paddy          | x     |           |       | x     | x         |       |
//! | Farmland       | x     |           |       |       | x         |       |
//! | `DrainedMarsh` |       | x         |       |       |           |       |
//! | `WaterChannel` |       |           |       | x     |           |       |
//! | Barren         |       | x         | x     |       |           |       |

use serde::Serialize;

use crate::enums::TerrainType;

/// Static behavior flags and presentation hints for one terrain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TerrainAttributes {
    /// Human-readable name.
    pub name: &'static str,
    /// RGB color used by the map overlay.
    pub map_color: [u8; 3],
    /// Whether a farm plot may be planted here.
    pub supports_crops: bool,
    /// Whether a livestock pen may be placed here.
    pub supports_livestock: bool,
    /// Whether a building may be placed here.
    pub buildable: bool,
    /// Whether the tile counts as water for the paddy adjacency check.
    pub water_source: bool,
    /// Cultivated land that digging tools must not destroy.
    pub protected_from_conversion: bool,
    /// Terrain that no tool can ever convert.
    pub never_convertible: bool,
}

const BASE: TerrainAttributes = TerrainAttributes {
    name: "",
    map_color: [0, 0, 0],
    supports_crops: false,
    supports_livestock: false,
    buildable: false,
    water_source: false,
    protected_from_conversion: false,
    never_convertible: false,
};

impl TerrainType {
    /// Look up the attribute row for this terrain type.
    pub const fn attributes(self) -> TerrainAttributes {
        match self {
            Self::Grass => TerrainAttributes {
                name: "Grass",
                map_color: [96, 168, 72],
                supports_livestock: true,
                ..BASE
            },
            Self::Dirt => TerrainAttributes {
                name: "Dirt",
                map_color: [139, 104, 66],
                supports_livestock: true,
                ..BASE
            },
            Self::Sand => TerrainAttributes {
                name: "Sand",
                map_color: [222, 204, 140],
                supports_livestock: true,
                ..BASE
            },
            Self::Water => TerrainAttributes {
                name: "Water",
                map_color: [52, 108, 196],
                water_source: true,
                never_convertible: true,
                ..BASE
            },
            Self::Stone => TerrainAttributes {
                name: "Stone",
                map_color: [128, 128, 132],
                buildable: true,
                never_convertible: true,
                ..BASE
            },
            Self::Forest => TerrainAttributes {
                name: "Forest",
                map_color: [34, 102, 46],
                ..BASE
            },
            Self::Marsh => TerrainAttributes {
                name: "Marsh",
                map_color: [88, 110, 78],
                ..BASE
            },
            Self::Paddy => TerrainAttributes {
                name: "Paddy",
                map_color: [120, 176, 160],
                supports_crops: true,
                water_source: true,
                protected_from_conversion: true,
                ..BASE
            },
            Self::Farmland => TerrainAttributes {
                name: "Farmland",
                map_color: [110, 76, 44],
                supports_crops: true,
                protected_from_conversion: true,
                ..BASE
            },
            Self::DrainedMarsh => TerrainAttributes {
                name: "Drained Marsh",
                map_color: [124, 120, 86],
                supports_livestock: true,
                ..BASE
            },
            Self::WaterChannel => TerrainAttributes {
                name: "Water Channel",
                map_color: [70, 130, 210],
                water_source: true,
                ..BASE
            },
            Self::Barren => TerrainAttributes {
                name: "Barren",
                map_color: [160, 146, 120],
                supports_livestock: true,
                buildable: true,
                ..BASE
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stone_and_water_are_fixed() {
        let fixed: Vec<TerrainType> = TerrainType::ALL
            .into_iter()
            .filter(|t| t.attributes().never_convertible)
            .collect();
        assert_eq!(fixed, vec![TerrainType::Water, TerrainType::Stone]);
    }

    #[test]
    fn buildable_set_is_barren_and_stone() {
        let buildable: Vec<TerrainType> = TerrainType::ALL
            .into_iter()
            .filter(|t| t.attributes().buildable)
            .collect();
        assert_eq!(buildable, vec![TerrainType::Stone, TerrainType::Barren]);
    }

    #[test]
    fn water_sources_for_paddy_check() {
        assert!(TerrainType::Water.attributes().water_source);
        assert!(TerrainType::WaterChannel.attributes().water_source);
        assert!(TerrainType::Paddy.attributes().water_source);
        assert!(!TerrainType::Marsh.attributes().water_source);
    }

    #[test]
    fn every_terrain_has_a_name() {
        for terrain in TerrainType::ALL {
            assert!(!terrain.attributes().name.is_empty(), "{terrain:?} has no name");
        }
    }
}
