//! Presentation Contract
//!
//! What the round expects from whoever draws the pot. Taps come back into
//! the round as `select_item` calls; the presenter never mutates state.

use std::sync::{Arc, Mutex};

use crate::game::events::{RoundEvent, RoundEventKind};
use crate::game::item::{Item, ItemId};
use crate::game::state::RoundState;

/// Scene collaborator.
pub trait ScenePresenter: Send {
    /// A fresh pool was generated.
    fn spawn_items(&mut self, items: &[Item]);

    /// An item's position, rotation or flags changed.
    fn update_item(&mut self, item: &Item);

    /// Visual-only shake reaction.
    fn perform_shake(&mut self);

    /// The round was torn down.
    fn clear(&mut self) {}
}

/// Forward a batch of round events to a presenter.
///
/// Items are read from `state`, so call this right after the operation that
/// produced the events.
pub fn present_events(scene: &mut dyn ScenePresenter, state: &RoundState, events: &[RoundEvent]) {
    for event in events {
        match &event.kind {
            RoundEventKind::RoundStarted { .. } => scene.spawn_items(&state.items),
            RoundEventKind::ItemSelected { item_id, .. } => update(scene, state, *item_id),
            RoundEventKind::Eliminated { items, .. } => {
                for id in items {
                    update(scene, state, *id);
                }
            }
            RoundEventKind::Shaken { .. } => {
                scene.perform_shake();
                for item in state.active_items() {
                    scene.update_item(item);
                }
            }
            _ => {}
        }
    }
}

fn update(scene: &mut dyn ScenePresenter, state: &RoundState, id: ItemId) {
    if let Some(item) = state.item(id) {
        scene.update_item(item);
    }
}

/// Headless presenter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScene;

impl ScenePresenter for NullScene {
    fn spawn_items(&mut self, _items: &[Item]) {}
    fn update_item(&mut self, _item: &Item) {}
    fn perform_shake(&mut self) {}
}

/// Counts presenter calls.
#[derive(Debug, Default, Clone)]
pub struct RecordingScene {
    /// Items in the last spawn
    pub spawned: usize,
    /// Updated item ids, in call order
    pub updated: Vec<ItemId>,
    /// Shake reactions
    pub shakes: u32,
    /// Teardowns
    pub clears: u32,
}

impl ScenePresenter for RecordingScene {
    fn spawn_items(&mut self, items: &[Item]) {
        self.spawned = items.len();
    }

    fn update_item(&mut self, item: &Item) {
        self.updated.push(item.id);
    }

    fn perform_shake(&mut self) {
        self.shakes += 1;
    }

    fn clear(&mut self) {
        self.clears += 1;
    }
}

impl<S: ScenePresenter> ScenePresenter for Arc<Mutex<S>> {
    fn spawn_items(&mut self, items: &[Item]) {
        self.lock().unwrap_or_else(|e| e.into_inner()).spawn_items(items);
    }

    fn update_item(&mut self, item: &Item) {
        self.lock().unwrap_or_else(|e| e.into_inner()).update_item(item);
    }

    fn perform_shake(&mut self) {
        self.lock().unwrap_or_else(|e| e.into_inner()).perform_shake();
    }

    fn clear(&mut self) {
        self.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
