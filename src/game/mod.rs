//! Game Logic Module
//!
//! The round engine. Deterministic for a given seed and input sequence;
//! no wall-clock or global state.
//!
//! ## Module Structure
//!
//! - `item`: Item catalog and item instances
//! - `tray`: Three-slot elimination tray
//! - `config`: Difficulty presets, pot bounds, scoring
//! - `theme`: Daily theme rotation
//! - `state`: Round state and item placement
//! - `round`: Round state machine transitions
//! - `tick`: Countdown clock and replay
//! - `input`: Recordable round inputs
//! - `motion`: Shake detection and cooldown
//! - `events`: Round events for hosts and replay

pub mod item;
pub mod tray;
pub mod config;
pub mod theme;
pub mod state;
pub mod round;
pub mod tick;
pub mod input;
pub mod motion;
pub mod events;

// Re-export key types
pub use item::{Item, ItemId, ItemType};
pub use tray::{EliminationTray, TrayOutcome, TrayMatch, TRAY_CAPACITY};
pub use config::{ConfigError, RoundConfiguration, PotBounds, ScoringRules};
pub use theme::{ThemeConfig, ThemeSelector, ThemeError, theme_for_day};
pub use state::{RoundState, RoundPhase};
pub use tick::{TickResult, tick, replay_round};
pub use input::RoundInput;
pub use motion::{ShakeDetector, MotionConfig, AccelerationSample, ShakeMode, ShakeEvent, MotionSensor};
pub use events::{RoundEvent, RoundEventKind, LossReason};
