//! Core deterministic primitives.
//!
//! Seeded randomness and state fingerprinting. Nothing in here reads the
//! wall clock or any global state.

pub mod rng;
pub mod hash;

// Re-export core types
pub use rng::{DeterministicRng, derive_round_seed};
pub use hash::{StateHash, StateHasher, compute_round_hash};
