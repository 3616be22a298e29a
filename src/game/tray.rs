//! Elimination Tray
//!
//! Three-slot staging area. Items tapped out of the pot land here; three of
//! the same type clear immediately.

use serde::{Serialize, Deserialize};

use crate::game::item::{Item, ItemId, ItemType};

/// Number of tray slots.
pub const TRAY_CAPACITY: usize = 3;

/// Items of one type needed to clear.
pub const MATCH_SIZE: usize = 3;

/// A tray member. Holds enough of the item to decide matches without
/// borrowing the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraySlot {
    /// Item in this slot
    pub id: ItemId,
    /// Its type
    pub item_type: ItemType,
}

/// A cleared group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrayMatch {
    /// Type that cleared
    pub item_type: ItemType,
    /// Members removed from the tray, oldest first
    pub cleared: Vec<ItemId>,
}

/// Result of offering an item to the tray.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrayOutcome {
    /// Tray was full or the item was already a member. Nothing changed.
    Rejected,
    /// Item appended, no match formed.
    Added,
    /// Item appended and completed a group, which was removed.
    Matched(TrayMatch),
}

impl TrayOutcome {
    /// True when the add completed a three-match.
    #[inline]
    pub fn is_match(&self) -> bool {
        matches!(self, TrayOutcome::Matched(_))
    }

    /// True when the item made it into the tray (with or without a match).
    #[inline]
    pub fn accepted(&self) -> bool {
        !matches!(self, TrayOutcome::Rejected)
    }
}

/// The elimination tray. Insertion order is kept, oldest first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EliminationTray {
    slots: Vec<TraySlot>,
}

impl EliminationTray {
    /// Create an empty tray.
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(TRAY_CAPACITY),
        }
    }

    /// Current members, oldest first.
    pub fn slots(&self) -> &[TraySlot] {
        &self.slots
    }

    /// Number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// No occupied slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.len() >= TRAY_CAPACITY
    }

    /// Whether an item is currently in the tray.
    pub fn contains(&self, id: ItemId) -> bool {
        self.slots.iter().any(|s| s.id == id)
    }

    /// Offer an item to the tray.
    ///
    /// On acceptance the item is marked selected. If its type now has three
    /// members, every member of that type is removed and reported; marking
    /// them eliminated is the caller's job.
    pub fn add_item(&mut self, item: &mut Item) -> TrayOutcome {
        if self.is_full() || self.contains(item.id) {
            return TrayOutcome::Rejected;
        }

        self.slots.push(TraySlot {
            id: item.id,
            item_type: item.item_type,
        });
        item.is_selected = true;

        match self.matching_type() {
            Some(item_type) => {
                let cleared = self.remove_type(item_type);
                TrayOutcome::Matched(TrayMatch { item_type, cleared })
            }
            None => TrayOutcome::Added,
        }
    }

    /// Deselect and drop every member. Members are looked up in `pool`.
    pub fn clear(&mut self, pool: &mut [Item]) {
        for slot in self.slots.drain(..) {
            if let Some(item) = pool.iter_mut().find(|i| i.id == slot.id) {
                item.is_selected = false;
            }
        }
    }

    /// Deselect and remove one item without running match logic.
    ///
    /// Returns false if the item was not in the tray.
    pub fn remove(&mut self, item: &mut Item) -> bool {
        let before = self.slots.len();
        self.slots.retain(|s| s.id != item.id);
        let removed = self.slots.len() != before;
        if removed {
            item.is_selected = false;
        }
        removed
    }

    /// First type (in slot order) with a full group.
    fn matching_type(&self) -> Option<ItemType> {
        self.slots
            .iter()
            .map(|s| s.item_type)
            .find(|t| self.slots.iter().filter(|s| s.item_type == *t).count() >= MATCH_SIZE)
    }

    fn remove_type(&mut self, item_type: ItemType) -> Vec<ItemId> {
        let cleared = self
            .slots
            .iter()
            .filter(|s| s.item_type == item_type)
            .map(|s| s.id)
            .collect();
        self.slots.retain(|s| s.item_type != item_type);
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use proptest::prelude::*;

    fn item(id: u32, item_type: ItemType) -> Item {
        Item::new(ItemId(id), item_type, Vec3::ZERO, Vec3::ZERO)
    }

    #[test]
    fn test_third_of_a_kind_clears() {
        let mut tray = EliminationTray::new();
        let mut a = item(1, ItemType::Apple);
        let mut b = item(2, ItemType::Apple);
        let mut c = item(3, ItemType::Apple);

        assert_eq!(tray.add_item(&mut a), TrayOutcome::Added);
        assert_eq!(tray.add_item(&mut b), TrayOutcome::Added);
        assert!(a.is_selected && b.is_selected);

        let outcome = tray.add_item(&mut c);
        assert_eq!(
            outcome,
            TrayOutcome::Matched(TrayMatch {
                item_type: ItemType::Apple,
                cleared: vec![ItemId(1), ItemId(2), ItemId(3)],
            })
        );
        assert!(tray.is_empty());
    }

    #[test]
    fn test_full_tray_rejects_without_change() {
        let mut tray = EliminationTray::new();
        let mut items = [
            item(1, ItemType::Apple),
            item(2, ItemType::Banana),
            item(3, ItemType::Carrot),
        ];
        for it in items.iter_mut() {
            assert_eq!(tray.add_item(it), TrayOutcome::Added);
        }
        assert!(tray.is_full());

        let snapshot = tray.slots().to_vec();
        let mut extra = item(4, ItemType::Apple);
        assert_eq!(tray.add_item(&mut extra), TrayOutcome::Rejected);
        assert!(!extra.is_selected);
        assert_eq!(tray.slots(), snapshot.as_slice());
    }

    #[test]
    fn test_same_item_twice_rejected() {
        let mut tray = EliminationTray::new();
        let mut a = item(1, ItemType::Egg);
        assert!(tray.add_item(&mut a).accepted());
        assert_eq!(tray.add_item(&mut a), TrayOutcome::Rejected);
        assert_eq!(tray.len(), 1);
    }

    #[test]
    fn test_clear_deselects() {
        let mut tray = EliminationTray::new();
        let mut pool = vec![item(1, ItemType::Fish), item(2, ItemType::Grape)];
        for it in pool.iter_mut() {
            tray.add_item(it);
        }

        tray.clear(&mut pool);
        assert!(tray.is_empty());
        assert!(pool.iter().all(|i| !i.is_selected));
    }

    #[test]
    fn test_remove_skips_match_logic() {
        let mut tray = EliminationTray::new();
        let mut a = item(1, ItemType::Lemon);
        let mut b = item(2, ItemType::Lemon);
        tray.add_item(&mut a);
        tray.add_item(&mut b);

        assert!(tray.remove(&mut a));
        assert!(!a.is_selected);
        assert_eq!(tray.len(), 1);
        assert!(!tray.remove(&mut a));

        // Still needs two more lemons to clear
        let mut c = item(3, ItemType::Lemon);
        assert_eq!(tray.add_item(&mut c), TrayOutcome::Added);
    }

    #[test]
    fn test_match_only_removes_matching_type() {
        let mut tray = EliminationTray::new();
        let mut a = item(1, ItemType::Kiwi);
        let mut b = item(2, ItemType::Kiwi);
        tray.add_item(&mut a);
        tray.add_item(&mut b);

        let mut c = item(3, ItemType::Kiwi);
        assert!(tray.add_item(&mut c).is_match());
        assert!(!tray.slots().iter().any(|s| s.item_type == ItemType::Kiwi));
    }

    proptest! {
        #[test]
        fn prop_tray_size_bounds(types in prop::collection::vec(0usize..4, 1..40)) {
            let mut tray = EliminationTray::new();
            for (i, t) in types.into_iter().enumerate() {
                let mut it = item(i as u32, ItemType::ALL[t]);
                let outcome = tray.add_item(&mut it);
                match outcome {
                    TrayOutcome::Matched(m) => {
                        prop_assert!(tray.len() <= 2);
                        prop_assert_eq!(m.cleared.len(), MATCH_SIZE);
                        prop_assert!(!tray.slots().iter().any(|s| s.item_type == m.item_type));
                    }
                    TrayOutcome::Added => prop_assert!(tray.len() <= TRAY_CAPACITY),
                    TrayOutcome::Rejected => prop_assert!(tray.is_full()),
                }
                let mut ids: Vec<_> = tray.slots().iter().map(|s| s.id).collect();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), tray.len());
            }
        }

        #[test]
        fn prop_distinct_types_grow_by_one(n in 1usize..6) {
            let mut tray = EliminationTray::new();
            for i in 0..n {
                let mut it = item(i as u32, ItemType::ALL[i]);
                let before = tray.len();
                let outcome = tray.add_item(&mut it);
                if before < TRAY_CAPACITY {
                    prop_assert_eq!(outcome, TrayOutcome::Added);
                    prop_assert_eq!(tray.len(), before + 1);
                } else {
                    prop_assert_eq!(outcome, TrayOutcome::Rejected);
                    prop_assert_eq!(tray.len(), TRAY_CAPACITY);
                }
            }
        }
    }
}
