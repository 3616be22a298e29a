//! Seeded Randomness
//!
//! Xorshift128+ seeded through SplitMix64. Every random choice a round makes
//! (where each item sits in the pot, how it is turned, the order items are
//! laid out, every re-scatter on shake) is drawn from one of these, so a
//! seed pins down the whole layout.

use std::f32::consts::TAU;

use chrono::NaiveDate;
use glam::Vec3;
use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// Xorshift128+ generator.
///
/// # Example
///
/// ```
/// use anser::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(2026);
/// let mut b = DeterministicRng::new(2026);
/// assert_eq!(a.random_rotation(), b.random_rotation());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Generator for `seed`. Nearby seeds still give unrelated streams.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let a = splitmix64(&mut s);
        let b = splitmix64(&mut s);
        // All-zero state would stick at zero
        let state = if a | b == 0 { [1, 1] } else { [a, b] };
        Self { state }
    }

    /// Next raw 64 bits.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let [s0, mut s1] = self.state;
        let out = s0.wrapping_add(s1);
        s1 ^= s0;
        self.state = [s0.rotate_left(24) ^ s1 ^ (s1 << 16), s1.rotate_left(37)];
        out
    }

    /// Uniform index in `[0, bound)`; 0 when `bound` is 0.
    #[inline]
    pub fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() % bound as u64) as usize
    }

    /// Uniform in `[0, 1)` with 24 bits of precision.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 * (1.0 / (1u32 << 24) as f32)
    }

    /// Uniform in `[min, max]`; `min` if the range is empty.
    #[inline]
    pub fn next_f32_range(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        (min + (max - min) * self.next_f32()).min(max)
    }

    /// Point uniformly distributed in a vertical cylinder around the Y axis.
    ///
    /// Radius is drawn as `R * sqrt(u)` so the density is flat over the
    /// disc instead of piling up in the middle of the pot.
    pub fn random_point_in_cylinder(&mut self, radius: f32, min_y: f32, max_y: f32) -> Vec3 {
        let r = radius.max(0.0) * self.next_f32().sqrt();
        let theta = self.next_f32_range(0.0, TAU);
        let y = self.next_f32_range(min_y, max_y);
        Vec3::new(r * theta.cos(), y, r * theta.sin())
    }

    /// Euler angles, each in `[0, 2π]`.
    pub fn random_rotation(&mut self) -> Vec3 {
        let x = self.next_f32_range(0.0, TAU);
        let y = self.next_f32_range(0.0, TAU);
        let z = self.next_f32_range(0.0, TAU);
        Vec3::new(x, y, z)
    }

    /// Fisher-Yates, back to front.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for a daily round.
///
/// Same day, theme and level means the same pot for every player.
pub fn derive_round_seed(day: NaiveDate, theme_id: u32, level: u32) -> u64 {
    let digest = Sha256::new()
        .chain_update(b"ANSER_ROUND_SEED_V1")
        .chain_update(day.format("%Y-%m-%d").to_string())
        .chain_update(theme_id.to_le_bytes())
        .chain_update(level.to_le_bytes())
        .finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head)
}
