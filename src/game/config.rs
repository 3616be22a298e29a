//! Round Configuration Presets
//!
//! Difficulty tiers consumed by the round state machine, plus the pot
//! geometry and scoring constants a round plays under.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::item::ItemType;

/// Configuration errors.
///
/// These are startup faults: a round is never constructed from a
/// configuration that fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No item types to place.
    #[error("item palette is empty")]
    EmptyPalette,

    /// Not enough items to give every type a full group.
    #[error("item count {item_count} cannot fill {types} types with groups of three")]
    ItemCountTooSmall {
        /// Configured item count
        item_count: u32,
        /// Configured number of types
        types: usize,
    },

    /// Round would be lost before it starts.
    #[error("time limit must be positive")]
    ZeroTimeLimit,

    /// Round would be won before it starts.
    #[error("target eliminations must be positive")]
    ZeroTarget,
}

/// Immutable per-round configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundConfiguration {
    /// Difficulty tier
    pub level: u32,
    /// Countdown length (whole seconds)
    pub time_limit: u32,
    /// Three-matches needed to win
    pub target_eliminations: u32,
    /// Items placed in the pot
    pub item_count: u32,
    /// Types placed, a subset of the catalog
    pub item_types: Vec<ItemType>,
}

impl RoundConfiguration {
    /// Tutorial tier: 2 minutes, 5 clears, 24 items over 4 types.
    pub fn level1() -> Self {
        Self {
            level: 1,
            time_limit: 120,
            target_eliminations: 5,
            item_count: 24,
            item_types: ItemType::first(4),
        }
    }

    /// Challenge tier: 3 minutes, 12 clears, 48 items over 8 types.
    pub fn level2() -> Self {
        Self {
            level: 2,
            time_limit: 180,
            target_eliminations: 12,
            item_count: 48,
            item_types: ItemType::first(8),
        }
    }

    /// Preset for a level. Level 1 and below get the tutorial tier,
    /// anything higher the challenge tier.
    pub fn for_level(level: u32) -> Self {
        if level <= 1 {
            Self::level1()
        } else {
            Self::level2()
        }
    }

    /// Same tier, but drawing types from a theme palette instead of the
    /// catalog prefix. The palette is truncated to the tier's type count.
    pub fn with_palette(mut self, palette: &[ItemType]) -> Self {
        let wanted = self.item_types.len();
        self.item_types = palette.iter().copied().take(wanted).collect();
        self
    }

    /// Items placed per type. The remainder of an uneven split is dropped.
    pub fn items_per_type(&self) -> u32 {
        if self.item_types.is_empty() {
            return 0;
        }
        self.item_count / self.item_types.len() as u32
    }

    /// Check preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_types.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if self.items_per_type() < 3 {
            return Err(ConfigError::ItemCountTooSmall {
                item_count: self.item_count,
                types: self.item_types.len(),
            });
        }
        if self.time_limit == 0 {
            return Err(ConfigError::ZeroTimeLimit);
        }
        if self.target_eliminations == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        Ok(())
    }
}

impl Default for RoundConfiguration {
    fn default() -> Self {
        Self::level1()
    }
}

/// Usable volume of the pot: a vertical cylinder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PotBounds {
    /// Horizontal radius
    pub radius: f32,
    /// Lowest item height
    pub min_y: f32,
    /// Highest item height
    pub max_y: f32,
}

impl Default for PotBounds {
    fn default() -> Self {
        Self {
            radius: 4.0,
            min_y: 0.5,
            max_y: 3.0,
        }
    }
}

impl PotBounds {
    /// Whether a point lies in the usable volume.
    pub fn contains(&self, p: glam::Vec3) -> bool {
        let horizontal = (p.x * p.x + p.z * p.z).sqrt();
        horizontal <= self.radius + 1e-4 && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Score awarded per three-match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Flat award per clear
    pub base: u32,
    /// Bonus per full ten seconds left on the clock
    pub time_bonus_unit: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            base: 100,
            time_bonus_unit: 1,
        }
    }
}

impl ScoringRules {
    /// Points for a clear with `seconds_remaining` on the clock.
    #[inline]
    pub fn award(&self, seconds_remaining: u32) -> u32 {
        self.base + (seconds_remaining / 10) * self.time_bonus_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(RoundConfiguration::level1().validate(), Ok(()));
        assert_eq!(RoundConfiguration::level2().validate(), Ok(()));
        assert_eq!(RoundConfiguration::level1().items_per_type(), 6);
        assert_eq!(RoundConfiguration::level2().items_per_type(), 6);
    }

    #[test]
    fn test_for_level() {
        assert_eq!(RoundConfiguration::for_level(0).level, 1);
        assert_eq!(RoundConfiguration::for_level(1).level, 1);
        assert_eq!(RoundConfiguration::for_level(2).level, 2);
        assert_eq!(RoundConfiguration::for_level(9).level, 2);
    }

    #[test]
    fn test_empty_palette_rejected() {
        let config = RoundConfiguration::level1().with_palette(&[]);
        assert_eq!(config.validate(), Err(ConfigError::EmptyPalette));
    }

    #[test]
    fn test_palette_truncated_to_tier() {
        let palette = [
            ItemType::Fish,
            ItemType::Egg,
            ItemType::Lemon,
            ItemType::Juice,
            ItemType::Carrot,
            ItemType::Kiwi,
        ];
        let config = RoundConfiguration::level1().with_palette(&palette);
        assert_eq!(config.item_types, palette[..4].to_vec());
        assert_eq!(config.item_count, 24);
    }

    #[test]
    fn test_too_few_items() {
        let config = RoundConfiguration {
            item_count: 10,
            ..RoundConfiguration::level1()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ItemCountTooSmall { item_count: 10, types: 4 })
        ));
    }

    #[test]
    fn test_uneven_split_truncates() {
        let config = RoundConfiguration {
            item_count: 26,
            ..RoundConfiguration::level1()
        };
        assert_eq!(config.items_per_type(), 6);
    }

    #[test]
    fn test_scoring() {
        let rules = ScoringRules::default();
        assert_eq!(rules.award(120), 112);
        assert_eq!(rules.award(59), 105);
        assert_eq!(rules.award(9), 100);
        assert_eq!(rules.award(0), 100);
    }
}
