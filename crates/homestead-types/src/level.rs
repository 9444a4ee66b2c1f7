//! Civilization level: the monotonic progression counter.
//!
//! Levels run from 1 to 10. Only the transitions out of levels 1 through 3
//! have conditions today; levels 5 and above have names but no path to
//! reach them.

use serde::{Deserialize, Serialize};

/// Display names for each level, indexed by `level - 1`.
const LEVEL_NAMES: [&str; 10] = [
    "Foragers' Camp",
    "Farming Hamlet",
    "Herding Village",
    "Market Town",
    "Walled Town",
    "City",
    "Kingdom",
    "Empire",
    "Golden Age",
    "Eternal Civilization",
];

/// A civilization level in `[1, 10]`.
///
/// Construction is validated, so every value of this type is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CivilizationLevel(u8);

impl CivilizationLevel {
    /// The starting level.
    pub const MIN: Self = Self(1);
    /// The highest level the counter can represent.
    pub const MAX: Self = Self(10);

    /// Create a level, returning `None` when `raw` is outside `[1, 10]`.
    pub const fn new(raw: u8) -> Option<Self> {
        if raw >= Self::MIN.0 && raw <= Self::MAX.0 {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Return the raw level number.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Return the level one step above this one, or `None` at the maximum.
    pub const fn next(self) -> Option<Self> {
        Self::new(self.0.saturating_add(1))
    }

    /// Human-readable name of this level.
    pub fn name(self) -> &'static str {
        LEVEL_NAMES
            .get(usize::from(self.0.saturating_sub(1)))
            .copied()
            .unwrap_or("Unknown")
    }

    /// Whether content gated at `required` is available at this level.
    pub fn is_item_available(self, required: Self) -> bool {
        required <= self
    }
}

impl Default for CivilizationLevel {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for CivilizationLevel {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| format!("civilization level {raw} is outside 1..=10"))
    }
}

impl From<CivilizationLevel> for u8 {
    fn from(level: CivilizationLevel) -> Self {
        level.0
    }
}

impl core::fmt::Display for CivilizationLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.0, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_validated() {
        assert!(CivilizationLevel::new(0).is_none());
        assert!(CivilizationLevel::new(11).is_none());
        assert_eq!(CivilizationLevel::new(4).map(CivilizationLevel::get), Some(4));
    }

    #[test]
    fn next_stops_at_max() {
        assert_eq!(CivilizationLevel::MIN.next().map(CivilizationLevel::get), Some(2));
        assert_eq!(CivilizationLevel::MAX.next(), None);
    }

    #[test]
    fn availability_is_inclusive() {
        let level = CivilizationLevel::new(3).unwrap_or_default();
        assert!(level.is_item_available(CivilizationLevel::MIN));
        assert!(level.is_item_available(level));
        assert!(!level.is_item_available(CivilizationLevel::new(4).unwrap_or_default()));
    }

    #[test]
    fn names_cover_every_level() {
        assert_eq!(CivilizationLevel::MIN.name(), "Foragers' Camp");
        assert_eq!(CivilizationLevel::MAX.name(), "Eternal Civilization");
    }

    #[test]
    fn serde_rejects_out_of_range() {
        let ok: Result<CivilizationLevel, _> = serde_json::from_str("2");
        assert!(ok.is_ok());
        let bad: Result<CivilizationLevel, _> = serde_json::from_str("12");
        assert!(bad.is_err());
    }
}
