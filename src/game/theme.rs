//! Daily Theme Rotation
//!
//! A theme is picked per calendar day by counting whole days from a fixed
//! start date and wrapping around the library. The selector caches the
//! current theme id so the host can poll cheaply (on app activation and
//! hourly) and react only when the day actually rolled over.

use std::num::NonZeroUsize;

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::info;

use crate::game::item::ItemType;

/// Theme errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    /// Selector built with no themes.
    #[error("theme library is empty")]
    EmptyCatalog,
}

/// Theme grouping shown in the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeCategory {
    /// Everyday menus
    Daily,
    /// Seasonal menus
    Seasonal,
    /// Holiday menus
    Festival,
    /// Regional cuisine
    Cultural,
}

/// Immutable daily theme.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Library index
    pub id: u32,
    /// Display name
    pub name: String,
    /// Grouping
    pub category: ThemeCategory,
    /// Blurb
    pub description: String,
    /// Item palette
    pub item_types: Vec<ItemType>,
    /// Background colour, `#RRGGBB`
    pub background_color: String,
    /// Accent colour, `#RRGGBB`
    pub accent_color: String,
    /// Reward unlocked by winning this theme
    pub unlock_reward_id: String,
    /// 1 (easy) to 5 (hard)
    pub difficulty: u8,
}

impl ThemeConfig {
    #[allow(clippy::too_many_arguments)]
    fn builtin(
        id: u32,
        name: &str,
        category: ThemeCategory,
        description: &str,
        item_types: [ItemType; 6],
        background_color: &str,
        accent_color: &str,
        unlock_reward_id: &str,
        difficulty: u8,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            category,
            description: description.to_string(),
            item_types: item_types.to_vec(),
            background_color: background_color.to_string(),
            accent_color: accent_color.to_string(),
            unlock_reward_id: unlock_reward_id.to_string(),
            difficulty,
        }
    }

    /// Background colour as RGBA in [0, 1].
    pub fn background_rgba(&self) -> Option<[f32; 4]> {
        parse_hex_color(&self.background_color)
    }

    /// Accent colour as RGBA in [0, 1].
    pub fn accent_rgba(&self) -> Option<[f32; 4]> {
        parse_hex_color(&self.accent_color)
    }
}

/// First day of the rotation (theme 0).
pub fn rotation_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 16).unwrap_or_default()
}

/// The built-in theme library.
pub fn builtin_themes() -> Vec<ThemeConfig> {
    use ItemType::*;
    use ThemeCategory::*;

    vec![
        ThemeConfig::builtin(
            0, "Fresh Produce", Daily,
            "A healthy haul of fruit and vegetables",
            [Apple, Banana, Carrot, Grape, Kiwi, Lemon],
            "#90EE90", "#32CD32", "goose_fresh", 1,
        ),
        ThemeConfig::builtin(
            1, "Sweet Treats", Daily,
            "Desserts that brighten the day",
            [Donut, IceCream, Juice, Hamburger, Apple, Banana],
            "#FFB6C1", "#FF69B4", "goose_sweet", 1,
        ),
        ThemeConfig::builtin(
            2, "Ocean Feast", Daily,
            "Fresh flavours from the sea",
            [Fish, Egg, Lemon, Juice, Carrot, Kiwi],
            "#87CEEB", "#4169E1", "goose_ocean", 2,
        ),
        ThemeConfig::builtin(
            3, "Breakfast Time", Daily,
            "A good day starts with breakfast",
            [Egg, Hamburger, Juice, Apple, Banana, Donut],
            "#FFE4B5", "#FFA500", "goose_breakfast", 2,
        ),
        ThemeConfig::builtin(
            4, "Tropical Vibes", Seasonal,
            "A tropical fruit party",
            [Banana, Kiwi, Lemon, Grape, Juice, IceCream],
            "#FFD700", "#FF8C00", "goose_tropical", 3,
        ),
        ThemeConfig::builtin(
            5, "Light & Healthy", Daily,
            "Light, balanced eating",
            [Carrot, Kiwi, Fish, Egg, Apple, Grape],
            "#98FB98", "#228B22", "goose_healthy", 2,
        ),
        ThemeConfig::builtin(
            6, "Weekend Feast", Daily,
            "Sharing food with family and friends",
            [Hamburger, Donut, IceCream, Juice, Fish, Egg],
            "#FFA07A", "#FF6347", "goose_weekend", 3,
        ),
        ThemeConfig::builtin(
            7, "Juice Bar", Daily,
            "Cool, refreshing blends",
            [Juice, Apple, Carrot, Grape, Lemon, Kiwi],
            "#F0E68C", "#DAA520", "goose_juice", 2,
        ),
    ]
}

/// Theme index for a calendar day.
///
/// Whole days from `start` to `date`, reduced modulo `catalog_size` and
/// folded into `[0, catalog_size)` so days before the start wrap backwards.
pub fn theme_for_day(date: NaiveDate, start: NaiveDate, catalog_size: NonZeroUsize) -> usize {
    let size = catalog_size.get() as i64;
    let days = date.signed_duration_since(start).num_days();
    let mut index = days % size;
    if index < 0 {
        index += size;
    }
    index as usize
}

/// Parse `#RGB`, `#RRGGBB` or `#AARRGGBB` into RGBA floats.
pub fn parse_hex_color(hex: &str) -> Option<[f32; 4]> {
    let digits: String = hex.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let value = u32::from_str_radix(&digits, 16).ok()?;

    let (a, r, g, b) = match digits.len() {
        3 => (
            255,
            ((value >> 8) & 0xF) * 17,
            ((value >> 4) & 0xF) * 17,
            (value & 0xF) * 17,
        ),
        6 => (255, (value >> 16) & 0xFF, (value >> 8) & 0xFF, value & 0xFF),
        8 => (
            (value >> 24) & 0xFF,
            (value >> 16) & 0xFF,
            (value >> 8) & 0xFF,
            value & 0xFF,
        ),
        _ => return None,
    };

    Some([
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    ])
}

/// Caches the active theme and detects day rollover.
#[derive(Debug, Clone)]
pub struct ThemeSelector {
    themes: Vec<ThemeConfig>,
    start: NaiveDate,
    current: usize,
}

impl ThemeSelector {
    /// Build a selector positioned on `today`.
    pub fn new(
        themes: Vec<ThemeConfig>,
        start: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self, ThemeError> {
        let size = NonZeroUsize::new(themes.len()).ok_or(ThemeError::EmptyCatalog)?;
        let current = theme_for_day(today, start, size);
        Ok(Self { themes, start, current })
    }

    /// Built-in library starting on the rotation start date.
    pub fn builtin(today: NaiveDate) -> Self {
        let themes = builtin_themes();
        let size = NonZeroUsize::new(themes.len()).unwrap_or(NonZeroUsize::MIN);
        let start = rotation_start();
        let current = theme_for_day(today, start, size);
        Self { themes, start, current }
    }

    fn catalog_size(&self) -> NonZeroUsize {
        // Non-empty by construction.
        NonZeroUsize::new(self.themes.len()).unwrap_or(NonZeroUsize::MIN)
    }

    /// Active theme.
    pub fn current(&self) -> &ThemeConfig {
        &self.themes[self.current]
    }

    /// Theme that a given day would show.
    pub fn theme_for(&self, date: NaiveDate) -> &ThemeConfig {
        &self.themes[theme_for_day(date, self.start, self.catalog_size())]
    }

    /// Theme by library id, wrapping out-of-range ids.
    pub fn theme_by_id(&self, id: u32) -> &ThemeConfig {
        &self.themes[id as usize % self.themes.len()]
    }

    /// Number of themes in the library.
    pub fn len(&self) -> usize {
        self.themes.len()
    }

    /// Always false; an empty library cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Re-evaluate for `today`. Returns true if the theme changed.
    pub fn refresh(&mut self, today: NaiveDate) -> bool {
        let next = theme_for_day(today, self.start, self.catalog_size());
        if self.themes[next].id == self.themes[self.current].id {
            return false;
        }
        info!(
            "Theme changed: {} -> {}",
            self.themes[self.current].name, self.themes[next].name
        );
        self.current = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eight() -> NonZeroUsize {
        NonZeroUsize::new(8).unwrap()
    }

    #[test]
    fn test_start_day_is_theme_zero() {
        let start = rotation_start();
        assert_eq!(theme_for_day(start, start, eight()), 0);
    }

    #[test]
    fn test_day_before_start_wraps() {
        let start = rotation_start();
        let yesterday = start.pred_opt().unwrap();
        assert_eq!(theme_for_day(yesterday, start, eight()), 7);

        let long_ago = start - chrono::Duration::days(17);
        assert_eq!(theme_for_day(long_ago, start, eight()), 7);
    }

    #[test]
    fn test_rotation_cycles() {
        let start = rotation_start();
        for offset in 0..24 {
            let day = start + chrono::Duration::days(offset);
            assert_eq!(theme_for_day(day, start, eight()), (offset % 8) as usize);
        }
    }

    #[test]
    fn test_single_theme_catalog() {
        let start = rotation_start();
        let one = NonZeroUsize::new(1).unwrap();
        assert_eq!(theme_for_day(start + chrono::Duration::days(40), start, one), 0);
        assert_eq!(theme_for_day(start - chrono::Duration::days(40), start, one), 0);
    }

    #[test]
    fn test_builtin_library_shape() {
        let themes = builtin_themes();
        assert_eq!(themes.len(), 8);
        for (i, theme) in themes.iter().enumerate() {
            assert_eq!(theme.id as usize, i);
            assert_eq!(theme.item_types.len(), 6);
            assert!(theme.background_rgba().is_some());
            assert!(theme.accent_rgba().is_some());
            assert!((1..=5).contains(&theme.difficulty));
        }
    }

    #[test]
    fn test_empty_library_rejected() {
        let start = rotation_start();
        assert_eq!(
            ThemeSelector::new(Vec::new(), start, start).unwrap_err(),
            ThemeError::EmptyCatalog
        );
    }

    #[test]
    fn test_refresh_reports_change_once() {
        let start = rotation_start();
        let mut selector = ThemeSelector::builtin(start);
        assert_eq!(selector.current().id, 0);

        assert!(!selector.refresh(start));

        let tomorrow = start.succ_opt().unwrap();
        let upcoming = selector.theme_for(tomorrow).id;
        assert_eq!(selector.current().id, 0);
        assert!(selector.refresh(tomorrow));
        assert_eq!(selector.current().id, upcoming);
        assert_eq!(selector.current().id, 1);
        assert!(!selector.refresh(tomorrow));
    }

    #[test]
    fn test_theme_by_id_wraps() {
        let selector = ThemeSelector::builtin(rotation_start());
        assert_eq!(selector.theme_by_id(10).id, 2);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_hex_color("#0F0"), Some([0.0, 1.0, 0.0, 1.0]));
        assert_eq!(parse_hex_color("#000000FF"), Some([0.0, 0.0, 1.0, 0.0]));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
    }
}
