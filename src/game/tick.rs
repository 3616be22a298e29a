//! Round Clock
//!
//! The countdown runs in whole seconds. Any scheduler (a tokio interval, a
//! test harness, a simulation loop) drives it through `advance_time`, which
//! carries the part-second remainder between calls in whole microseconds
//! so long runs of small deltas add up exactly.

use tracing::trace;

use crate::game::config::{ConfigError, RoundConfiguration};
use crate::game::events::{LossReason, RoundEvent, RoundEventKind};
use crate::game::input::RoundInput;
use crate::game::state::RoundState;

const MICROS_PER_SECOND: u64 = 1_000_000;

/// Result of a clock step.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Every event queued on the round so far, oldest first
    pub events: Vec<RoundEvent>,
    /// Whole seconds taken off the clock
    pub seconds_elapsed: u32,
    /// Whether the round reached a terminal phase
    pub round_ended: bool,
}

impl RoundState {
    /// Advance the countdown by `delta` seconds. Returns the whole seconds
    /// applied.
    ///
    /// Only runs while playing; non-finite or non-positive deltas are
    /// ignored. Stops early when the clock hits zero.
    pub fn advance_time(&mut self, delta: f64) -> u32 {
        if !delta.is_finite() || delta <= 0.0 {
            return 0;
        }
        // Saturating float-to-int cast; rounding absorbs binary float error
        self.advance_micros((delta * MICROS_PER_SECOND as f64).round() as u64)
    }

    /// Advance the countdown by `micros` microseconds. Returns the whole
    /// seconds applied.
    pub fn advance_micros(&mut self, micros: u64) -> u32 {
        if !self.is_playing() {
            return 0;
        }

        self.clock_carry_us = self.clock_carry_us.saturating_add(micros);
        let mut applied = 0;
        while self.clock_carry_us >= MICROS_PER_SECOND && self.is_playing() {
            self.clock_carry_us -= MICROS_PER_SECOND;
            self.tick_second();
            applied += 1;
        }
        applied
    }

    /// Take one second off the clock. Returns false when not playing.
    ///
    /// Reaching zero loses the round.
    pub fn tick_second(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.push_event(RoundEventKind::TimeTick {
            time_remaining: self.time_remaining,
        });
        trace!(time_remaining = self.time_remaining, "Clock tick");

        if self.time_remaining == 0 {
            self.lose(LossReason::TimeUp);
        }
        true
    }
}

/// Advance a round's clock and collect its events.
pub fn tick(state: &mut RoundState, delta: f64) -> TickResult {
    let seconds_elapsed = state.advance_time(delta);
    TickResult {
        events: state.take_events(),
        seconds_elapsed,
        round_ended: state.phase.is_terminal(),
    }
}

/// Replay a round from recorded inputs.
///
/// Starts a fresh round from `seed` and `config`, applies inputs in order
/// and stops at the first terminal phase. Returns the final state and all
/// events.
pub fn replay_round(
    seed: u64,
    config: RoundConfiguration,
    inputs: &[RoundInput],
) -> Result<(RoundState, Vec<RoundEvent>), ConfigError> {
    let mut state = RoundState::new(seed);
    state.start_with(config)?;

    let mut all_events = state.take_events();
    for input in inputs {
        input.apply(&mut state);
        all_events.extend(state.take_events());
        if state.phase.is_terminal() {
            break;
        }
    }

    Ok((state, all_events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::item::ItemType;
    use crate::game::state::RoundPhase;

    fn playing(time_limit: u32) -> RoundState {
        let mut state = RoundState::new(12345);
        state
            .start_with(RoundConfiguration {
                time_limit,
                ..RoundConfiguration::level1()
            })
            .unwrap();
        state.take_events();
        state
    }

    #[test]
    fn test_time_up_after_exact_ticks() {
        let mut state = playing(10);
        for _ in 0..9 {
            assert!(state.tick_second());
        }
        assert_eq!(state.phase, RoundPhase::Playing);
        assert_eq!(state.time_remaining, 1);

        assert!(state.tick_second());
        assert_eq!(state.phase, RoundPhase::Lost);
        assert!(!state.tick_second());

        let lost = state.take_events().into_iter().last().map(|e| e.kind);
        assert!(matches!(
            lost,
            Some(RoundEventKind::RoundLost { reason: LossReason::TimeUp, .. })
        ));
    }

    #[test]
    fn test_fractional_time_accumulates() {
        let mut state = playing(120);
        assert_eq!(state.advance_time(0.25), 0);
        assert_eq!(state.advance_time(0.5), 0);
        assert_eq!(state.time_remaining, 120);
        assert_eq!(state.advance_time(0.25), 1);
        assert_eq!(state.time_remaining, 119);
        assert_eq!(state.advance_time(2.5), 2);
        assert_eq!(state.time_remaining, 117);
    }

    #[test]
    fn test_small_deltas_add_up_exactly() {
        let mut state = playing(120);
        let applied: u32 = (0..100).map(|_| state.advance_time(0.01)).sum();
        assert_eq!(applied, 1);
        assert_eq!(state.time_remaining, 119);

        let applied: u32 = (0..1000).map(|_| state.advance_time(0.001)).sum();
        assert_eq!(applied, 1);
        assert_eq!(state.time_remaining, 118);

        // Frame-sized steps from an f32 frame timer
        let frame = f64::from(1.0f32 / 60.0);
        let applied: u32 = (0..60 * 10).map(|_| state.advance_time(frame)).sum();
        assert_eq!(applied, 10);
        assert_eq!(state.time_remaining, 108);
    }

    #[test]
    fn test_full_round_of_small_deltas_runs_out() {
        let mut state = playing(120);
        for _ in 0..11_999 {
            state.advance_time(0.01);
        }
        assert_eq!(state.phase, RoundPhase::Playing);
        assert_eq!(state.time_remaining, 1);

        state.advance_time(0.01);
        assert_eq!(state.time_remaining, 0);
        assert_eq!(state.phase, RoundPhase::Lost);
    }

    #[test]
    fn test_millisecond_inputs_replay_exactly() {
        let config = RoundConfiguration {
            time_limit: 3,
            ..RoundConfiguration::level1()
        };
        let inputs = vec![RoundInput::Advance { millis: 10 }; 300];
        let (state, _) = replay_round(4, config, &inputs).unwrap();
        assert_eq!(state.time_remaining, 0);
        assert_eq!(state.phase, RoundPhase::Lost);
    }

    #[test]
    fn test_large_delta_stops_at_zero() {
        let mut state = playing(3);
        assert_eq!(state.advance_time(100.0), 3);
        assert_eq!(state.time_remaining, 0);
        assert_eq!(state.phase, RoundPhase::Lost);
        assert_eq!(state.advance_time(1.0), 0);
    }

    #[test]
    fn test_bad_deltas_ignored() {
        let mut state = playing(60);
        assert_eq!(state.advance_time(-1.0), 0);
        assert_eq!(state.advance_time(f64::NAN), 0);
        assert_eq!(state.advance_time(f64::INFINITY), 0);
        assert_eq!(state.time_remaining, 60);
    }

    #[test]
    fn test_clock_stopped_while_paused() {
        let mut state = playing(60);
        state.advance_time(0.75);
        state.pause();
        assert_eq!(state.advance_time(10.0), 0);
        state.resume();

        // Partial second from before the pause is discarded
        assert_eq!(state.advance_time(0.5), 0);
        assert_eq!(state.time_remaining, 60);
    }

    #[test]
    fn test_tick_collects_events() {
        let mut state = playing(2);
        let result = tick(&mut state, 1.0);
        assert_eq!(result.seconds_elapsed, 1);
        assert!(!result.round_ended);
        assert_eq!(
            result.events.last().map(|e| &e.kind),
            Some(&RoundEventKind::TimeTick { time_remaining: 1 })
        );

        let result = tick(&mut state, 1.0);
        assert!(result.round_ended);
        assert!(result.events.last().is_some_and(|e| e.is_terminal()));
    }

    #[test]
    fn test_score_bonus_shrinks_with_time() {
        let mut state = playing(120);
        state.advance_time(31.0);
        let apples: Vec<_> = state
            .items
            .iter()
            .filter(|i| i.item_type == ItemType::Apple)
            .map(|i| i.id)
            .take(3)
            .collect();
        for id in apples {
            state.select_item(id);
        }
        assert_eq!(state.score, 108);
    }

    #[test]
    fn test_replay_determinism() {
        let config = RoundConfiguration::level1();
        let (probe, _) = replay_round(99, config.clone(), &[]).unwrap();

        let mut inputs = Vec::new();
        for item in probe.items.iter().filter(|i| i.item_type == ItemType::Banana).take(3) {
            inputs.push(RoundInput::select(item.id));
            inputs.push(RoundInput::seconds(1));
        }
        inputs.push(RoundInput::Shake);
        inputs.push(RoundInput::seconds(4));

        let (a, events_a) = replay_round(99, config.clone(), &inputs).unwrap();
        let (b, events_b) = replay_round(99, config, &inputs).unwrap();

        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_eq!(events_a, events_b);
        assert_eq!(a.elimination_count, 1);
        assert_eq!(a.shake_count, 1);
        assert_eq!(a.time_remaining, 113);
    }

    #[test]
    fn test_replay_stops_at_terminal() {
        let config = RoundConfiguration {
            time_limit: 2,
            ..RoundConfiguration::level1()
        };
        let inputs = [RoundInput::seconds(5), RoundInput::Shake];
        let (state, events) = replay_round(1, config, &inputs).unwrap();
        assert_eq!(state.phase, RoundPhase::Lost);
        assert_eq!(state.shake_count, 0);
        assert!(events.last().is_some_and(|e| e.is_terminal()));
    }
}
