//! # Anser Round Engine
//!
//! Round logic for Anser, a daily-themed tap-to-match pot game: items are
//! scattered in a cylindrical pot, tapped into a three-slot tray, and cleared
//! in threes against a countdown. Shaking the device re-scatters the pot.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ANSER ROUND ENGINE                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Seeded Xorshift128+ and daily seeds       │
//! │  └── hash.rs     - Round fingerprinting                      │
//! │                                                              │
//! │  game/           - Round logic (deterministic)               │
//! │  ├── item.rs     - Item catalog and instances                │
//! │  ├── tray.rs     - Three-slot elimination tray               │
//! │  ├── config.rs   - Difficulty presets and scoring            │
//! │  ├── theme.rs    - Daily theme rotation                      │
//! │  ├── state.rs    - Round state and item placement            │
//! │  ├── round.rs    - Round state machine                       │
//! │  ├── tick.rs     - Countdown clock and replay                │
//! │  ├── input.rs    - Recordable inputs                         │
//! │  ├── motion.rs   - Shake detection                           │
//! │  └── events.rs   - Round events                              │
//! │                                                              │
//! │  services/       - Collaborator contracts                    │
//! │  ├── scene.rs    - Presentation                              │
//! │  ├── effects.rs  - Audio and haptics                         │
//! │  ├── records.rs  - Scores, statistics, persistence           │
//! │  ├── collection.rs - Reward catalog                          │
//! │  └── settings.rs - Player settings                           │
//! │                                                              │
//! │  session/        - Async round owner (tokio)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! `core/` and `game/` never read the wall clock or global state. Time is
//! fed in by the caller, all randomness comes from the round seed, and the
//! day's seed is derived from the date, theme and level. The same seed and
//! input sequence replay to the same round hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use crate::core::rng::{DeterministicRng, derive_round_seed};
pub use crate::core::hash::StateHash;
pub use crate::game::state::{RoundState, RoundPhase};
pub use crate::game::config::RoundConfiguration;
pub use crate::game::input::RoundInput;
pub use crate::game::theme::{ThemeConfig, ThemeSelector};
pub use crate::session::{RoundSession, SessionHandle, SessionConfig, SessionError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
