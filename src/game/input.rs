//! Round Inputs
//!
//! Everything that can drive a round from outside, as plain values. A
//! recorded input list plus the round seed reproduces a round exactly.

use serde::{Serialize, Deserialize};

use crate::game::item::ItemId;
use crate::game::state::RoundState;

/// One input to a running round.
///
/// Clock advances are carried in whole milliseconds so recordings compare
/// and serialize exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundInput {
    /// Player tapped an item
    Select {
        /// Tapped item
        item_id: ItemId,
    },
    /// Shake gesture or button accepted by the detector
    Shake,
    /// Host paused
    Pause,
    /// Host resumed
    Resume,
    /// Clock advanced
    Advance {
        /// Elapsed time in milliseconds
        millis: u32,
    },
}

impl RoundInput {
    /// Select an item.
    pub fn select(item_id: ItemId) -> Self {
        RoundInput::Select { item_id }
    }

    /// Advance the clock by whole seconds.
    pub fn seconds(secs: u32) -> Self {
        RoundInput::Advance {
            millis: secs.saturating_mul(1000),
        }
    }

    /// Apply to a round. Returns whether the round accepted it; clock
    /// advances count as accepted when at least one second came off.
    pub fn apply(self, state: &mut RoundState) -> bool {
        match self {
            RoundInput::Select { item_id } => state.select_item(item_id),
            RoundInput::Shake => state.trigger_shake(),
            RoundInput::Pause => state.pause(),
            RoundInput::Resume => state.resume(),
            RoundInput::Advance { millis } => {
                state.advance_micros(u64::from(millis) * 1000) > 0
            }
        }
    }
}
