//! Round Fingerprinting
//!
//! SHA-256 over the parts of a round that matter for replay: seed, phase,
//! counters, every item's pose and flags, and the tray. Two runs with the
//! same seed and inputs must fingerprint identically.

use glam::Vec3;
use sha2::{Sha256, Digest};

/// 32-byte fingerprint.
pub type StateHash = [u8; 32];

const ROUND_DOMAIN: &[u8] = b"ANSER_ROUND_STATE_V1";

/// Ordered SHA-256 accumulator. Integers go in little-endian, floats by
/// bit pattern, so the result is platform independent.
pub struct StateHasher {
    inner: Sha256,
}

impl StateHasher {
    /// Hasher prefixed with a domain tag.
    pub fn new(domain: &[u8]) -> Self {
        let mut inner = Sha256::new();
        inner.update(domain);
        Self { inner }
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    /// Append a byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.put(&[value]);
    }

    /// Append a u32.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.put(&value.to_le_bytes());
    }

    /// Append a u64.
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.put(&value.to_le_bytes());
    }

    /// Append an f32. `0.0` and `-0.0` hash differently.
    #[inline]
    pub fn update_f32(&mut self, value: f32) {
        self.update_u32(value.to_bits());
    }

    /// Append x, y, z in that order.
    pub fn update_vec3(&mut self, value: Vec3) {
        for component in value.to_array() {
            self.update_f32(component);
        }
    }

    /// Append a flag as one byte.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(u8::from(value));
    }

    /// Consume and produce the fingerprint.
    pub fn finalize(self) -> StateHash {
        self.inner.finalize().into()
    }
}

/// Fingerprint a round: seed and round counter first, then whatever
/// `add_state` appends.
pub fn compute_round_hash<F>(seed: u64, rounds_started: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::new(ROUND_DOMAIN);
    hasher.update_u64(seed);
    hasher.update_u32(rounds_started);
    add_state(&mut hasher);
    hasher.finalize()
}
