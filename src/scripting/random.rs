//! Deterministic randomness and stable hashing for scripts
//!
//! Scripts must produce identical output for identical input across runs
//! and devices, so they never get ambient randomness. [`SeededRandom`] is a
//! xoroshiro128++ generator seeded from two caller-supplied numbers
//! (typically timestamps), and [`stable_hash32`] is a fixed 32-bit mix used
//! to pick palette colors that stay stable for a given key.

use crate::scripting::color::GRAPH_PALETTE;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(GOLDEN_GAMMA);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn fmix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    x ^= x >> 33;
    x = x.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    x ^ (x >> 33)
}

/// Deterministic pseudo-random generator (xoroshiro128++) seeded from two
/// numbers. The same seeds always yield the same draw sequence.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    s0: u64,
    s1: u64,
}

impl SeededRandom {
    pub fn new(seed1: f64, seed2: f64) -> Self {
        let mut sm = seed1.to_bits() ^ fmix64(seed2.to_bits());
        let s0 = splitmix64(&mut sm);
        let mut s1 = splitmix64(&mut sm);
        // xoroshiro must not start from the all-zero state.
        if s0 == 0 && s1 == 0 {
            s1 = GOLDEN_GAMMA;
        }
        Self { s0, s1 }
    }

    /// Seed from a single number; the second seed defaults to zero.
    pub fn from_seed(seed: f64) -> Self {
        Self::new(seed, 0.0)
    }

    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.s0;
        let mut s1 = self.s1;
        let result = s0.wrapping_add(s1).rotate_left(17).wrapping_add(s0);
        s1 ^= s0;
        self.s0 = s0.rotate_left(49) ^ s1 ^ (s1 << 21);
        self.s1 = s1.rotate_left(28);
        result
    }

    /// Uniform draw in `[0, 1)` with 53 bits of precision.
    pub fn next_unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform draw in `[min, max)`.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_unit()
    }
}

/// Stable 32-bit hash of an integer key. Identical across runs, devices
/// and crate versions.
pub fn stable_hash32(value: u64) -> u32 {
    let h = fmix64(value);
    ((h >> 32) ^ h) as u32
}

/// Index into [`GRAPH_PALETTE`] for a key, stable for that key.
pub fn palette_index(value: u64) -> usize {
    stable_hash32(value) as usize % GRAPH_PALETTE.len()
}
