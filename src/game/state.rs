//! Round State Definitions
//!
//! The round aggregate: phase, clock, score, the item pool floating in the
//! pot and the tray. Lifecycle transitions live in `round.rs`, the clock in
//! `tick.rs`.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, compute_round_hash};
use crate::core::rng::DeterministicRng;
use crate::game::config::{PotBounds, RoundConfiguration, ScoringRules};
use crate::game::events::{RoundEvent, RoundEventKind};
use crate::game::item::{Item, ItemId, ItemType};
use crate::game::tray::EliminationTray;

// =============================================================================
// ROUND PHASE
// =============================================================================

/// Round phase.
///
/// ```text
/// Idle ──start──▶ Playing ◀──resume── Paused
///                   │  └──pause──────────▲
///                   ├──▶ Won   (terminal)
///                   └──▶ Lost  (terminal)
/// ```
///
/// Terminal phases only leave through a fresh `start` (or `end`, which
/// always returns to `Idle`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RoundPhase {
    /// No round running
    #[default]
    Idle = 0,
    /// Clock running, taps accepted
    Playing = 1,
    /// Clock stopped
    Paused = 2,
    /// Target reached
    Won = 3,
    /// Tray overflow or time up
    Lost = 4,
}

impl RoundPhase {
    /// Won or lost.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, RoundPhase::Won | RoundPhase::Lost)
    }
}

// =============================================================================
// ROUND STATE
// =============================================================================

/// Complete state of one round.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundState {
    /// Seed the round RNG was created from
    pub seed: u64,

    /// Layout RNG
    pub(crate) rng: DeterministicRng,

    /// Rounds started on this state (new `start` bumps it)
    pub rounds_started: u32,

    /// Current phase
    pub phase: RoundPhase,

    /// Configuration of the current (or last) round
    pub config: RoundConfiguration,

    /// Theme palette overriding the preset's catalog prefix
    pub palette: Option<Vec<ItemType>>,

    /// Score award rules
    pub scoring: ScoringRules,

    /// Usable pot volume
    pub pot: PotBounds,

    /// Accumulated score
    pub score: u32,

    /// Whole seconds left on the clock
    pub time_remaining: u32,

    /// Three-matches cleared
    pub elimination_count: u32,

    /// Shakes performed
    pub shake_count: u32,

    /// Items in the scene
    pub items: Vec<Item>,

    /// Elimination tray
    pub tray: EliminationTray,

    /// Microseconds toward the next whole second
    pub(crate) clock_carry_us: u64,

    /// Next item ID
    next_item_id: u32,

    /// Events not yet drained by the host
    #[serde(skip)]
    events: Vec<RoundEvent>,
}

impl RoundState {
    /// Create an idle round state with the given layout seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: DeterministicRng::new(seed),
            rounds_started: 0,
            phase: RoundPhase::Idle,
            config: RoundConfiguration::default(),
            palette: None,
            scoring: ScoringRules::default(),
            pot: PotBounds::default(),
            score: 0,
            time_remaining: 0,
            elimination_count: 0,
            shake_count: 0,
            items: Vec::new(),
            tray: EliminationTray::new(),
            clock_carry_us: 0,
            next_item_id: 1,
            events: Vec::new(),
        }
    }

    /// Idle state whose rounds draw types from a theme palette.
    pub fn with_palette(seed: u64, palette: Vec<ItemType>) -> Self {
        let mut state = Self::new(seed);
        state.palette = Some(palette);
        state
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Clock running and taps accepted.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == RoundPhase::Playing
    }

    /// Clock stopped by the player.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.phase == RoundPhase::Paused
    }

    /// Fraction of the target cleared, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.config.target_eliminations == 0 {
            return 0.0;
        }
        (self.elimination_count as f32 / self.config.target_eliminations as f32).min(1.0)
    }

    /// Seconds used so far.
    pub fn elapsed(&self) -> u32 {
        self.config.time_limit.saturating_sub(self.time_remaining)
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted_time(&self) -> String {
        format!("{:02}:{:02}", self.time_remaining / 60, self.time_remaining % 60)
    }

    /// Look up an item.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Look up an item mutably.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Items still floating in the pot (not eliminated).
    pub fn active_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| !i.is_eliminated)
    }

    /// Items cleared so far this round.
    pub fn eliminated_items(&self) -> Vec<&Item> {
        self.items.iter().filter(|i| i.is_eliminated).collect()
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Queue an event, stamped with the current round time.
    pub(crate) fn push_event(&mut self, kind: RoundEventKind) {
        let at = self.elapsed();
        self.events.push(RoundEvent::new(at, kind));
    }

    /// Record a phase change and its event.
    pub(crate) fn set_phase(&mut self, to: RoundPhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        self.push_event(RoundEventKind::PhaseChanged { from, to });
    }

    /// Drain queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events queued but not yet drained.
    pub fn pending_events(&self) -> &[RoundEvent] {
        &self.events
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Allocate a new item ID.
    fn next_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    /// Fill the pot for the current configuration.
    ///
    /// Every configured type gets `items_per_type` copies (remainder of an
    /// uneven split is dropped), each at a uniform point in the pot with a
    /// uniform rotation; the whole pool is then shuffled so the order carries
    /// no type adjacency.
    pub(crate) fn generate_items(&mut self) {
        self.items.clear();

        let per_type = self.config.items_per_type();
        let types = self.config.item_types.clone();
        let pot = self.pot;

        for item_type in types {
            for _ in 0..per_type {
                let id = self.next_id();
                let position = self.rng.random_point_in_cylinder(pot.radius, pot.min_y, pot.max_y);
                let rotation = self.rng.random_rotation();
                self.items.push(Item::new(id, item_type, position, rotation));
            }
        }

        self.rng.shuffle(&mut self.items);
    }

    /// Re-scatter every item still in play. Returns how many moved.
    ///
    /// Only position and rotation change; identity, type and flags are
    /// untouched. Tray members move too, since tray membership and pot
    /// position are independent.
    pub(crate) fn scatter_active_items(&mut self) -> u32 {
        let pot = self.pot;
        let mut moved = 0;
        for item in self.items.iter_mut().filter(|i| !i.is_eliminated) {
            item.position = self.rng.random_point_in_cylinder(pot.radius, pot.min_y, pot.max_y);
            item.rotation = self.rng.random_rotation();
            moved += 1;
        }
        moved
    }

    // =========================================================================
    // Fingerprint
    // =========================================================================

    /// Deterministic fingerprint of the round.
    pub fn compute_hash(&self) -> StateHash {
        compute_round_hash(self.seed, self.rounds_started, |hasher| {
            hasher.update_u8(self.phase as u8);
            hasher.update_u32(self.score);
            hasher.update_u32(self.time_remaining);
            hasher.update_u32(self.elimination_count);
            hasher.update_u32(self.shake_count);

            hasher.update_u32(self.items.len() as u32);
            for item in &self.items {
                hasher.update_u32(item.id.0);
                hasher.update_u8(item.item_type as u8);
                hasher.update_vec3(item.position);
                hasher.update_vec3(item.rotation);
                hasher.update_bool(item.is_selected);
                hasher.update_bool(item.is_eliminated);
            }

            hasher.update_u32(self.tray.len() as u32);
            for slot in self.tray.slots() {
                hasher.update_u32(slot.id.0);
            }
        })
    }
}
