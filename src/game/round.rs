//! Round State Machine
//!
//! Lifecycle transitions, tray interaction, scoring and win/loss evaluation.
//! Every operation is guard-and-ignore: an invalid call returns `false` (or
//! does nothing) and leaves the round untouched. Events produced by a call
//! are queued on the state; drain them with `RoundState::take_events`.

use tracing::{debug, info};

use crate::game::config::{ConfigError, RoundConfiguration};
use crate::game::events::{LossReason, RoundEventKind};
use crate::game::item::ItemId;
use crate::game::state::{RoundPhase, RoundState};
use crate::game::tray::TrayOutcome;

impl RoundState {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start a round at a difficulty tier.
    ///
    /// The preset for `level` is used; if the state carries a theme palette,
    /// the preset draws its types from it.
    pub fn start(&mut self, level: u32) -> Result<(), ConfigError> {
        let mut config = RoundConfiguration::for_level(level);
        if let Some(palette) = &self.palette {
            config = config.with_palette(palette);
        }
        self.start_with(config)
    }

    /// Start a round with an explicit configuration.
    ///
    /// Valid from any phase; a running round is discarded. Fails only if the
    /// configuration does not validate, in which case nothing changes.
    pub fn start_with(&mut self, config: RoundConfiguration) -> Result<(), ConfigError> {
        config.validate()?;

        self.tray.clear(&mut self.items);
        self.items.clear();

        self.score = 0;
        self.time_remaining = config.time_limit;
        self.elimination_count = 0;
        self.shake_count = 0;
        self.clock_carry_us = 0;
        self.rounds_started += 1;
        self.config = config;

        self.generate_items();

        // Restarts pass through idle so observers see the old round close
        if self.phase != RoundPhase::Idle {
            self.set_phase(RoundPhase::Idle);
        }
        self.set_phase(RoundPhase::Playing);
        self.push_event(RoundEventKind::RoundStarted {
            level: self.config.level,
            item_count: self.items.len() as u32,
            time_limit: self.config.time_limit,
        });

        info!(
            level = self.config.level,
            items = self.items.len(),
            time_limit = self.config.time_limit,
            target = self.config.target_eliminations,
            "Round started"
        );
        Ok(())
    }

    /// Stop the clock. Only valid while playing.
    pub fn pause(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.clock_carry_us = 0;
        self.set_phase(RoundPhase::Paused);
        debug!(time_remaining = self.time_remaining, "Round paused");
        true
    }

    /// Restart the clock. Only valid while paused.
    pub fn resume(&mut self) -> bool {
        if !self.is_paused() {
            return false;
        }
        self.clock_carry_us = 0;
        self.set_phase(RoundPhase::Playing);
        debug!(time_remaining = self.time_remaining, "Round resumed");
        true
    }

    /// Tear the round down and return to idle. Callable from any phase,
    /// any number of times. Score and counters are kept for result screens.
    pub fn end(&mut self) {
        self.clock_carry_us = 0;
        self.tray.clear(&mut self.items);
        self.items.clear();
        if self.phase != RoundPhase::Idle {
            info!(score = self.score, from = ?self.phase, "Round ended");
            self.set_phase(RoundPhase::Idle);
        }
    }

    // =========================================================================
    // Player actions
    // =========================================================================

    /// Tap an item into the tray.
    ///
    /// Returns whether the item was accepted. Rejected when not playing, when
    /// the item is unknown, already selected or eliminated, or the tray is
    /// full.
    pub fn select_item(&mut self, id: ItemId) -> bool {
        if !self.is_playing() {
            return false;
        }

        let Some(index) = self.items.iter().position(|i| i.id == id) else {
            return false;
        };
        if !self.items[index].is_selectable() {
            return false;
        }

        let item_type = self.items[index].item_type;
        let outcome = self.tray.add_item(&mut self.items[index]);

        match outcome {
            TrayOutcome::Rejected => false,
            TrayOutcome::Added => {
                self.push_event(RoundEventKind::ItemSelected {
                    item_id: id,
                    item_type,
                    tray_len: self.tray.len(),
                });
                if self.tray.is_full() {
                    self.lose(LossReason::TrayOverflow);
                }
                true
            }
            TrayOutcome::Matched(matched) => {
                self.push_event(RoundEventKind::ItemSelected {
                    item_id: id,
                    item_type,
                    tray_len: self.tray.len(),
                });

                for cleared in &matched.cleared {
                    if let Some(item) = self.item_mut(*cleared) {
                        item.eliminate();
                    }
                }

                let points = self.scoring.award(self.time_remaining);
                self.score += points;
                self.elimination_count += 1;

                debug!(
                    item_type = matched.item_type.key(),
                    points,
                    score = self.score,
                    eliminations = self.elimination_count,
                    "Three-match cleared"
                );

                self.push_event(RoundEventKind::Eliminated {
                    item_type: matched.item_type,
                    items: matched.cleared,
                    points,
                    score: self.score,
                    elimination_count: self.elimination_count,
                });

                if self.elimination_count >= self.config.target_eliminations {
                    self.win();
                }
                true
            }
        }
    }

    /// Re-scatter every item still in play. Only valid while playing.
    ///
    /// Score, tray and win/loss are unaffected.
    pub fn trigger_shake(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }

        self.shake_count += 1;
        let moved = self.scatter_active_items();
        self.push_event(RoundEventKind::Shaken {
            shake_count: self.shake_count,
            moved,
        });

        debug!(shake_count = self.shake_count, moved, "Pot shaken");
        true
    }

    // =========================================================================
    // Outcomes
    // =========================================================================

    fn win(&mut self) {
        self.clock_carry_us = 0;
        self.set_phase(RoundPhase::Won);
        self.push_event(RoundEventKind::RoundWon {
            score: self.score,
            time_remaining: self.time_remaining,
        });
        info!(score = self.score, time_remaining = self.time_remaining, "Round won");
    }

    pub(crate) fn lose(&mut self, reason: LossReason) {
        self.clock_carry_us = 0;
        self.set_phase(RoundPhase::Lost);
        self.push_event(RoundEventKind::RoundLost {
            reason,
            score: self.score,
            time_remaining: self.time_remaining,
        });
        info!(?reason, score = self.score, "Round lost");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::item::ItemType;

    /// Selectable items of one type, in pool order.
    fn of_type(state: &RoundState, item_type: ItemType) -> Vec<ItemId> {
        state
            .items
            .iter()
            .filter(|i| i.item_type == item_type && i.is_selectable())
            .map(|i| i.id)
            .collect()
    }

    fn clear_one(state: &mut RoundState, item_type: ItemType) {
        let ids = of_type(state, item_type);
        for id in &ids[..3] {
            assert!(state.select_item(*id));
        }
    }

    fn playing(level: u32) -> RoundState {
        let mut state = RoundState::new(12345);
        state.start(level).unwrap();
        state
    }

    #[test]
    fn test_start_resets_round() {
        let state = playing(1);
        assert_eq!(state.phase, RoundPhase::Playing);
        assert_eq!(state.time_remaining, 120);
        assert_eq!(state.items.len(), 24);
        assert_eq!(state.score, 0);
        assert!(state.tray.is_empty());

        let state = playing(2);
        assert_eq!(state.time_remaining, 180);
        assert_eq!(state.items.len(), 48);
    }

    #[test]
    fn test_start_uses_palette() {
        let palette = vec![
            ItemType::Fish,
            ItemType::Egg,
            ItemType::Lemon,
            ItemType::Juice,
            ItemType::Kiwi,
            ItemType::Grape,
        ];
        let mut state = RoundState::with_palette(1, palette.clone());
        state.start(1).unwrap();
        assert!(state.items.iter().all(|i| palette[..4].contains(&i.item_type)));
    }

    #[test]
    fn test_invalid_config_rejected_without_change() {
        let mut state = RoundState::with_palette(1, Vec::new());
        assert_eq!(state.start(1), Err(ConfigError::EmptyPalette));
        assert_eq!(state.phase, RoundPhase::Idle);
        assert!(state.items.is_empty());
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_pause_resume_guards() {
        let mut state = RoundState::new(1);
        assert!(!state.pause());
        assert!(!state.resume());

        state.start(1).unwrap();
        assert!(!state.resume());
        assert!(state.pause());
        assert!(!state.pause());
        assert_eq!(state.phase, RoundPhase::Paused);
        assert!(state.resume());
        assert_eq!(state.phase, RoundPhase::Playing);
    }

    #[test]
    fn test_select_rejected_while_paused() {
        let mut state = playing(1);
        let id = state.items[0].id;
        state.pause();
        assert!(!state.select_item(id));
        assert!(state.tray.is_empty());
    }

    #[test]
    fn test_select_same_item_twice() {
        let mut state = playing(1);
        let id = state.items[0].id;
        assert!(state.select_item(id));
        assert!(!state.select_item(id));
        assert!(!state.select_item(ItemId(9999)));
        assert_eq!(state.tray.len(), 1);
    }

    #[test]
    fn test_match_scores_and_eliminates() {
        let mut state = playing(1);
        let ids = of_type(&state, ItemType::Apple);
        for id in &ids[..3] {
            assert!(state.select_item(*id));
        }

        assert_eq!(state.elimination_count, 1);
        assert_eq!(state.score, 112);
        assert!(state.tray.is_empty());
        for id in &ids[..3] {
            let item = state.item(*id).unwrap();
            assert!(item.is_eliminated);
            assert!(!item.is_selected);
        }
        assert_eq!(state.eliminated_items().len(), 3);
        assert!(!state.select_item(ids[0]));
    }

    #[test]
    fn test_exactly_target_matches_wins() {
        let mut state = playing(1);
        let order = [
            ItemType::Apple,
            ItemType::Banana,
            ItemType::Carrot,
            ItemType::Donut,
        ];
        for item_type in order {
            clear_one(&mut state, item_type);
            assert_eq!(state.phase, RoundPhase::Playing);
        }
        assert_eq!(state.elimination_count, 4);

        clear_one(&mut state, ItemType::Apple);
        assert_eq!(state.elimination_count, 5);
        assert_eq!(state.phase, RoundPhase::Won);
        assert!((state.progress() - 1.0).abs() < f32::EPSILON);

        let events = state.take_events();
        assert!(events.last().is_some_and(|e| e.is_terminal()));
    }

    #[test]
    fn test_tray_overflow_loses() {
        let mut state = playing(1);
        let a = of_type(&state, ItemType::Apple)[0];
        let b = of_type(&state, ItemType::Banana)[0];
        let c = of_type(&state, ItemType::Carrot)[0];

        assert!(state.select_item(a));
        assert!(state.select_item(b));
        assert_eq!(state.phase, RoundPhase::Playing);
        assert!(state.select_item(c));
        assert_eq!(state.phase, RoundPhase::Lost);

        let lost = state
            .take_events()
            .into_iter()
            .find(|e| e.is_terminal())
            .map(|e| e.kind);
        assert!(matches!(
            lost,
            Some(RoundEventKind::RoundLost { reason: LossReason::TrayOverflow, .. })
        ));
    }

    #[test]
    fn test_overflow_with_pair_in_tray() {
        let mut state = playing(3);
        let apples = of_type(&state, ItemType::Apple);
        let banana = of_type(&state, ItemType::Banana)[0];
        assert!(state.select_item(banana));
        assert!(state.select_item(apples[0]));
        assert!(state.select_item(apples[1]));
        assert_eq!(state.tray.len(), 3);
        assert_eq!(state.phase, RoundPhase::Lost);
    }

    #[test]
    fn test_win_checked_on_matching_add() {
        let mut state = RoundState::new(3);
        state.start_with(RoundConfiguration {
            target_eliminations: 1,
            ..RoundConfiguration::level1()
        }).unwrap();

        let apples = of_type(&state, ItemType::Apple);
        assert!(state.select_item(apples[0]));
        assert!(state.select_item(apples[1]));
        assert!(state.select_item(apples[2]));
        assert_eq!(state.phase, RoundPhase::Won);
        assert!(!state.select_item(apples[3]));
    }

    #[test]
    fn test_shake_preserves_identity() {
        let mut state = playing(1);
        clear_one(&mut state, ItemType::Carrot);
        let in_tray = of_type(&state, ItemType::Donut)[0];
        state.select_item(in_tray);

        let before = state.items.clone();
        assert!(state.trigger_shake());
        assert_eq!(state.shake_count, 1);

        for (old, new) in before.iter().zip(state.items.iter()) {
            assert_eq!(old.id, new.id);
            assert_eq!(old.item_type, new.item_type);
            assert_eq!(old.is_eliminated, new.is_eliminated);
            assert_eq!(old.is_selected, new.is_selected);
            if old.is_eliminated {
                assert_eq!(old.position, new.position);
                assert_eq!(old.rotation, new.rotation);
            } else {
                assert!(state.pot.contains(new.position));
            }
        }
        assert_ne!(
            before.iter().map(|i| i.position).collect::<Vec<_>>(),
            state.items.iter().map(|i| i.position).collect::<Vec<_>>()
        );
        assert!(state.tray.contains(in_tray));
    }

    #[test]
    fn test_shake_requires_playing() {
        let mut state = RoundState::new(1);
        assert!(!state.trigger_shake());
        state.start(1).unwrap();
        state.pause();
        assert!(!state.trigger_shake());
        assert_eq!(state.shake_count, 0);
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut state = playing(1);
        let id = state.items[0].id;
        state.select_item(id);

        state.end();
        assert_eq!(state.phase, RoundPhase::Idle);
        assert!(state.tray.is_empty());
        assert!(state.items.is_empty());
        state.end();
        assert_eq!(state.phase, RoundPhase::Idle);

        let mut idle = RoundState::new(1);
        idle.end();
        assert!(idle.take_events().is_empty());
    }

    #[test]
    fn test_restart_after_loss() {
        let mut state = playing(1);
        let a = of_type(&state, ItemType::Apple)[0];
        let b = of_type(&state, ItemType::Banana)[0];
        let c = of_type(&state, ItemType::Carrot)[0];
        state.select_item(a);
        state.select_item(b);
        state.select_item(c);
        assert_eq!(state.phase, RoundPhase::Lost);
        assert!(!state.resume());

        state.start(1).unwrap();
        assert_eq!(state.phase, RoundPhase::Playing);
        assert!(state.tray.is_empty());
        assert_eq!(state.rounds_started, 2);
        assert!(state.items.iter().all(|i| i.is_selectable()));
    }
}
