//! Round Events
//!
//! Every mutating round operation returns the events it produced, in the
//! order they happened. Hosts forward them to presentation, audio and
//! persistence; nothing in the round calls out on its own.

use serde::{Serialize, Deserialize};

use crate::game::item::{ItemId, ItemType};
use crate::game::state::RoundPhase;

/// Why a round was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// Tray filled up without forming a match
    TrayOverflow,
    /// Countdown reached zero
    TimeUp,
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RoundEventKind {
    /// A new round started and its pot was filled.
    RoundStarted {
        level: u32,
        item_count: u32,
        time_limit: u32,
    },

    /// Phase transition.
    PhaseChanged {
        from: RoundPhase,
        to: RoundPhase,
    },

    /// An item moved from the pot into the tray.
    ItemSelected {
        item_id: ItemId,
        item_type: ItemType,
        tray_len: usize,
    },

    /// Three of a kind cleared.
    Eliminated {
        item_type: ItemType,
        items: Vec<ItemId>,
        points: u32,
        score: u32,
        elimination_count: u32,
    },

    /// Remaining items were re-scattered.
    Shaken {
        shake_count: u32,
        moved: u32,
    },

    /// One second came off the clock.
    TimeTick {
        time_remaining: u32,
    },

    /// Target reached.
    RoundWon {
        score: u32,
        time_remaining: u32,
    },

    /// Round failed.
    RoundLost {
        reason: LossReason,
        score: u32,
        time_remaining: u32,
    },
}

/// A round event stamped with round time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundEvent {
    /// Whole seconds elapsed in the round when the event happened
    pub at: u32,
    /// Payload
    pub kind: RoundEventKind,
}

impl RoundEvent {
    /// Create a new event.
    pub fn new(at: u32, kind: RoundEventKind) -> Self {
        Self { at, kind }
    }

    /// Whether this event ends the round.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            RoundEventKind::RoundWon { .. } | RoundEventKind::RoundLost { .. }
        )
    }
}
