//! Item Registry
//!
//! The fixed catalog of item types and the item instances a round places
//! in the pot.

use glam::Vec3;
use serde::{Serialize, Deserialize};

// =============================================================================
// ITEM TYPE
// =============================================================================

/// Catalog item type. Equality is by variant; this is the matching key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ItemType {
    /// Apple
    Apple = 0,
    /// Banana
    Banana = 1,
    /// Carrot
    Carrot = 2,
    /// Donut
    Donut = 3,
    /// Egg
    Egg = 4,
    /// Fish
    Fish = 5,
    /// Grape
    Grape = 6,
    /// Hamburger
    Hamburger = 7,
    /// Ice cream
    IceCream = 8,
    /// Juice
    Juice = 9,
    /// Kiwi
    Kiwi = 10,
    /// Lemon
    Lemon = 11,
}

impl ItemType {
    /// Every catalog entry, in catalog order.
    pub const ALL: [ItemType; 12] = [
        ItemType::Apple,
        ItemType::Banana,
        ItemType::Carrot,
        ItemType::Donut,
        ItemType::Egg,
        ItemType::Fish,
        ItemType::Grape,
        ItemType::Hamburger,
        ItemType::IceCream,
        ItemType::Juice,
        ItemType::Kiwi,
        ItemType::Lemon,
    ];

    /// Number of catalog entries.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable key used by asset lookups and persisted records.
    pub fn key(self) -> &'static str {
        match self {
            ItemType::Apple => "apple",
            ItemType::Banana => "banana",
            ItemType::Carrot => "carrot",
            ItemType::Donut => "donut",
            ItemType::Egg => "egg",
            ItemType::Fish => "fish",
            ItemType::Grape => "grape",
            ItemType::Hamburger => "hamburger",
            ItemType::IceCream => "icecream",
            ItemType::Juice => "juice",
            ItemType::Kiwi => "kiwi",
            ItemType::Lemon => "lemon",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            ItemType::Apple => "Apple",
            ItemType::Banana => "Banana",
            ItemType::Carrot => "Carrot",
            ItemType::Donut => "Donut",
            ItemType::Egg => "Egg",
            ItemType::Fish => "Fish",
            ItemType::Grape => "Grape",
            ItemType::Hamburger => "Hamburger",
            ItemType::IceCream => "Ice Cream",
            ItemType::Juice => "Juice",
            ItemType::Kiwi => "Kiwi",
            ItemType::Lemon => "Lemon",
        }
    }

    /// Parse a catalog key.
    pub fn from_key(key: &str) -> Option<ItemType> {
        Self::ALL.iter().copied().find(|t| t.key() == key)
    }

    /// First `n` catalog entries (clamped to the catalog size).
    pub fn first(n: usize) -> Vec<ItemType> {
        Self::ALL.iter().copied().take(n).collect()
    }
}

// =============================================================================
// ITEM
// =============================================================================

/// Identifier of an item within a round. Unique and stable for the item's
/// lifetime; never reused inside the same round state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// An item floating in the pot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique id
    pub id: ItemId,

    /// Catalog type
    pub item_type: ItemType,

    /// Position inside the pot
    pub position: Vec3,

    /// Euler rotation (radians)
    pub rotation: Vec3,

    /// Currently sitting in the tray
    pub is_selected: bool,

    /// Still rendered in the scene
    pub is_visible: bool,

    /// Cleared by a three-match. Terminal.
    pub is_eliminated: bool,

    /// Uniform scale
    pub scale: f32,
}

impl Item {
    /// Create a fresh, unselected item.
    pub fn new(id: ItemId, item_type: ItemType, position: Vec3, rotation: Vec3) -> Self {
        Self {
            id,
            item_type,
            position,
            rotation,
            is_selected: false,
            is_visible: true,
            is_eliminated: false,
            scale: 1.0,
        }
    }

    /// Whether the item can still be tapped into the tray.
    #[inline]
    pub fn is_selectable(&self) -> bool {
        !self.is_selected && !self.is_eliminated
    }

    /// Same type and both still in play.
    pub fn can_match(&self, other: &Item) -> bool {
        self.item_type == other.item_type && !self.is_eliminated && !other.is_eliminated
    }

    /// Mark eliminated. Returns false if it already was.
    pub fn eliminate(&mut self) -> bool {
        if self.is_eliminated {
            return false;
        }
        self.is_eliminated = true;
        self.is_selected = false;
        self.is_visible = false;
        true
    }
}
