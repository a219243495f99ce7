// Deterministic, injectable uniform random sources.
//
// The chord generator's only nondeterminism is the uniform draw behind each
// weighted selection. Every generation entry point takes a `UniformSource`
// so callers choose where those draws come from:
//
// - `SongRng`: xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64
//   seeding. Hand-rolled so output is identical on every platform and the
//   state can be serialized alongside a saved song.
// - `ReplaySource`: replays a fixed, cyclic list of draws. Used by golden
//   tests that need to know exactly which candidate each step picks.
//
// **Critical constraint: determinism.** `SongRng` must produce identical
// output given the same prior state regardless of platform or compiler. The
// core generator uses integer arithmetic only; floats appear solely in the
// final conversion to [0, 1).

use serde::{Deserialize, Serialize};

/// A pluggable source of uniform draws in `[0, 1)`.
pub trait UniformSource {
    /// Next uniform draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `[0, len)`.
    ///
    /// Panics if `len == 0`.
    fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "index: len must be positive");
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

impl<T: UniformSource + ?Sized> UniformSource for &mut T {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }

    fn index(&mut self, len: usize) -> usize {
        (**self).index(len)
    }
}

impl<T: UniformSource + ?Sized> UniformSource for Box<T> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }

    fn index(&mut self, len: usize) -> usize {
        (**self).index(len)
    }
}

/// Xoshiro256++ PRNG, the default source for chord generation.
///
/// Two `SongRng` instances created with the same seed produce identical
/// sequences, which is what makes a "seed" shareable between users.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SongRng {
    s: [u64; 4],
}

impl SongRng {
    /// Create a new generator seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Seed from the system clock. Only for interactive use; anything that
    /// must be reproducible should pass an explicit seed.
    pub fn from_time() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::new(nanos)
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform integer in `[low, high)` by rejection sampling, so small
    /// pools are not skewed by modulo bias.
    ///
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }
}

impl UniformSource for SongRng {
    /// Upper 53 bits of a `u64` fill the f64 mantissa.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "index: len must be positive");
        self.range_u64(0, len as u64) as usize
    }
}

/// Replays a fixed list of draws, wrapping around when exhausted.
///
/// Values are clamped into `[0, 1)`. An empty list behaves like a constant
/// stream of `0.0`, which always picks the first candidate.
#[derive(Clone, Debug, Default)]
pub struct ReplaySource {
    draws: Vec<f64>,
    cursor: usize,
}

impl ReplaySource {
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        let draws = draws
            .into()
            .into_iter()
            .map(|d| d.clamp(0.0, MAX_DRAW))
            .collect();
        Self { draws, cursor: 0 }
    }

    /// A source that returns `value` forever.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

/// Largest f64 strictly below 1.0.
const MAX_DRAW: f64 = 1.0 - f64::EPSILON / 2.0;

impl UniformSource for ReplaySource {
    fn next_f64(&mut self) -> f64 {
        if self.draws.is_empty() {
            self.cursor += 1;
            return 0.0;
        }
        let v = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        v
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_output() {
        let mut a = SongRng::new(42);
        let mut b = SongRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_different_output() {
        let mut a = SongRng::new(42);
        let mut b = SongRng::new(43);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn f64_in_unit_range() {
        let mut rng = SongRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "f64 out of range: {v}");
        }
    }

    #[test]
    fn index_within_bounds_and_reaches_top() {
        let mut rng = SongRng::new(555);
        let mut saw_top = false;
        for _ in 0..10_000 {
            let v = rng.index(7);
            assert!(v < 7, "index out of range: {v}");
            saw_top |= v == 6;
        }
        assert!(saw_top, "index should reach len - 1");
    }

    #[test]
    fn index_of_one_is_always_zero() {
        let mut rng = SongRng::new(1);
        for _ in 0..100 {
            assert_eq!(rng.index(1), 0);
        }
    }

    #[test]
    fn replay_cycles_through_draws() {
        let mut src = ReplaySource::new(vec![0.1, 0.5, 0.9]);
        let got: Vec<f64> = (0..5).map(|_| src.next_f64()).collect();
        assert_eq!(got, vec![0.1, 0.5, 0.9, 0.1, 0.5]);
        assert_eq!(src.consumed(), 5);
    }

    #[test]
    fn replay_clamps_out_of_range_draws() {
        let mut src = ReplaySource::new(vec![-3.0, 1.0]);
        assert_eq!(src.next_f64(), 0.0);
        let top = src.next_f64();
        assert!(top < 1.0);
        // A clamped 1.0 still maps to the last index, never past it.
        assert_eq!(ReplaySource::constant(1.0).index(4), 3);
    }

    #[test]
    fn empty_replay_is_constant_zero() {
        let mut src = ReplaySource::default();
        assert_eq!(src.next_f64(), 0.0);
        assert_eq!(src.index(9), 0);
    }

    #[test]
    fn trait_objects_forward_draws() {
        let mut boxed: Box<dyn UniformSource> = Box::new(ReplaySource::constant(0.5));
        assert_eq!(boxed.index(4), 2);
        let mut rng = SongRng::new(7);
        let by_ref: &mut dyn UniformSource = &mut rng;
        assert!(by_ref.next_f64() < 1.0);
    }

    #[test]
    fn serialization_roundtrip() {
        let mut rng = SongRng::new(42);
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: SongRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
