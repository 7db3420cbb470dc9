//! Deterministic pseudorandom streams for reproducible input generation.
//!
//! Every input the benchmark generates is drawn from a [`SeededRng`], a 64-bit
//! linear congruential generator with a pure `state -> (value, state)`
//! transition. Reproducibility under concurrency comes from stream
//! partitioning rather than locking: [`SeededRng::jump_ahead`] computes the
//! state after exactly `n` transitions in O(log n), so each worker can be
//! handed a disjoint subsequence of one master seed with no runtime
//! coordination.

/// LCG multiplier (Knuth, MMIX).
const MULTIPLIER: u64 = 6_364_136_223_846_793_005;

/// LCG increment (Knuth, MMIX).
const INCREMENT: u64 = 1_442_695_040_888_963_407;

/// Transitions separating consecutive worker streams.
///
/// Far larger than any worker could consume in a run, so per-worker
/// subsequences never overlap.
pub const WORKER_STREAM_STRIDE: u64 = 1 << 40;

/// A seeded pseudorandom stream with O(log n) jump-ahead.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a stream from a seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Create the stream for worker `index` of a run seeded with
    /// `master_seed`.
    ///
    /// Each worker receives a disjoint subsequence of the master stream,
    /// `WORKER_STREAM_STRIDE` transitions apart.
    pub fn for_worker(master_seed: u64, index: u64) -> Self {
        Self::new(Self::jump_ahead(
            master_seed,
            index.wrapping_mul(WORKER_STREAM_STRIDE),
        ))
    }

    /// The state after exactly `n` sequential transitions from `seed`,
    /// computed by repeated squaring of the affine transition, not by
    /// iterating.
    ///
    /// A stream created from `jump_ahead(s, n)` and drawn once yields the
    /// same value as a stream created from `s` and drawn `n + 1` times.
    pub fn jump_ahead(seed: u64, n: u64) -> u64 {
        // The transition f(x) = A*x + C composes as
        // f^(j+k)(x) = (Aj*Ak)*x + (Aj*Ck + Cj), all mod 2^64.
        let mut acc_mult: u64 = 1;
        let mut acc_inc: u64 = 0;
        let mut cur_mult = MULTIPLIER;
        let mut cur_inc = INCREMENT;
        let mut remaining = n;

        while remaining > 0 {
            if remaining & 1 == 1 {
                acc_mult = acc_mult.wrapping_mul(cur_mult);
                acc_inc = acc_inc.wrapping_mul(cur_mult).wrapping_add(cur_inc);
            }
            cur_inc = cur_inc.wrapping_mul(cur_mult).wrapping_add(cur_inc);
            cur_mult = cur_mult.wrapping_mul(cur_mult);
            remaining >>= 1;
        }

        seed.wrapping_mul(acc_mult).wrapping_add(acc_inc)
    }

    /// Advance the stream and return the raw 64-bit draw.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT);
        self.state
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        // Top 53 bits give a uniform double in [0, 1).
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform draw in `[min, max]` inclusive.
    ///
    /// `min == max` always returns `min`. `min > max` is a programming
    /// error.
    pub fn next_i64_range(&mut self, min: i64, max: i64) -> i64 {
        debug_assert!(min <= max, "next_i64_range called with min > max");
        if min >= max {
            return min;
        }
        let span = (max as i128 - min as i128 + 1) as u128;
        let offset = (self.next_u64() as u128) % span;
        (min as i128 + offset as i128) as i64
    }

    /// Uniform draw in `[min, max]` inclusive over the 32-bit domain.
    pub fn next_i32_range(&mut self, min: i32, max: i32) -> i32 {
        self.next_i64_range(min as i64, max as i64) as i32
    }

    /// Non-uniform draw in `[p, q]` per the benchmark's prescribed skewed
    /// distribution.
    ///
    /// Combines a uniform draw over `[0, a]` and one over `[p, q]` with
    /// bitwise OR, adds the run constant `c`, reduces modulo `q - p + 1` and
    /// offsets by `p`. The bit pattern is normative for compliance; do not
    /// restructure it.
    pub fn non_uniform_i64(&mut self, p: i64, q: i64, a: i64, c: i64) -> i64 {
        debug_assert!(p <= q, "non_uniform_i64 called with p > q");
        let high = self.next_i64_range(0, a);
        let low = self.next_i64_range(p, q);
        let span = q as i128 - p as i128 + 1;
        let combined = (high | low) as i128 + c as i128;
        (combined.rem_euclid(span) + p as i128) as i64
    }

    /// Non-uniform draw over the 32-bit domain.
    pub fn non_uniform_i32(&mut self, p: i32, q: i32, a: i32, c: i32) -> i32 {
        self.non_uniform_i64(p as i64, q as i64, a as i64, c as i64) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let mut a = SeededRng::new(20260824);
        let mut b = SeededRng::new(20260824);
        for _ in 0..1000 {
            assert_eq!(
                a.next_i64_range(0, 1_000_000),
                b.next_i64_range(0, 1_000_000)
            );
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededRng::new(1);
        let mut b = SeededRng::new(2);
        let same = (0..100)
            .filter(|_| a.next_u64() == b.next_u64())
            .count();
        assert_eq!(same, 0);
    }

    #[test]
    fn test_jump_ahead_matches_sequential_draws() {
        let seed = 42u64;
        let mut sequential = SeededRng::new(seed);
        for n in 0..=10_000u64 {
            // After this draw the sequential stream has advanced n + 1 times.
            let expected = sequential.next_u64();
            let mut jumped = SeededRng::new(SeededRng::jump_ahead(seed, n));
            assert_eq!(jumped.next_u64(), expected, "mismatch at n = {}", n);
        }
    }

    #[test]
    fn test_jump_ahead_zero_is_identity() {
        assert_eq!(SeededRng::jump_ahead(777, 0), 777);
    }

    #[test]
    fn test_worker_streams_are_disjoint_prefixes() {
        let mut w0 = SeededRng::for_worker(9, 0);
        let mut w1 = SeededRng::for_worker(9, 1);
        let first: Vec<u64> = (0..256).map(|_| w0.next_u64()).collect();
        let second: Vec<u64> = (0..256).map(|_| w1.next_u64()).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn test_range_containment() {
        let mut rng = SeededRng::new(7);
        for _ in 0..10_000 {
            let v = rng.next_i64_range(-50, 1000);
            assert!((-50..=1000).contains(&v));
        }
        for _ in 0..10_000 {
            let v = rng.next_i32_range(3, 4);
            assert!((3..=4).contains(&v));
        }
    }

    #[test]
    fn test_degenerate_range_returns_min() {
        let mut rng = SeededRng::new(7);
        for _ in 0..100 {
            assert_eq!(rng.next_i64_range(12, 12), 12);
        }
        assert_eq!(rng.next_i32_range(-3, -3), -3);
    }

    #[test]
    fn test_full_i64_range_does_not_panic() {
        let mut rng = SeededRng::new(7);
        for _ in 0..100 {
            let _ = rng.next_i64_range(i64::MIN, i64::MAX);
        }
    }

    #[test]
    fn test_next_f64_unit_interval() {
        let mut rng = SeededRng::new(99);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_non_uniform_containment() {
        let mut rng = SeededRng::new(123);
        for _ in 0..10_000 {
            let v = rng.non_uniform_i64(1, 100_000, 1023, 7911);
            assert!((1..=100_000).contains(&v));
        }
    }

    #[test]
    fn test_non_uniform_is_reproducible() {
        let mut a = SeededRng::new(555);
        let mut b = SeededRng::new(555);
        for _ in 0..1000 {
            assert_eq!(
                a.non_uniform_i32(1, 3000, 255, 123),
                b.non_uniform_i32(1, 3000, 255, 123)
            );
        }
    }
}
