//! Deterministic PRNG for cone sampling.
//!
//! A fresh generator is created at the start of every rebuild with
//! [`REBUILD_SEED`], so an unchanged input snapshot always yields the same
//! ray directions. The core algorithm is pure integer arithmetic.

/// Seed used for the per-rebuild generator.
pub const REBUILD_SEED: u64 = 12345;

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Uses shifts (13, 7, 17). A seed of 0 is replaced with a non-zero fallback
/// to avoid the all-zeros fixed point.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Generator used for one rebuild.
    pub fn for_rebuild() -> Self {
        Self::new(REBUILD_SEED)
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns a uniformly distributed f32 in [0, 1).
    ///
    /// Uses the upper 24 bits so every result is exactly representable and
    /// strictly below 1.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_produces_known_golden_value_for_seed_42() {
        // If this breaks, every cone pattern in existing scenes changes.
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_does_not_produce_all_zeros() {
        let mut rng = Xorshift64::new(0);
        assert_ne!(rng.next_u64(), 0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn rebuild_generators_repeat() {
        let mut a = Xorshift64::for_rebuild();
        let mut b = Xorshift64::for_rebuild();
        for i in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64(), "diverged at index {i}");
        }
    }

    #[test]
    fn next_f32_always_in_unit_interval() {
        let mut rng = Xorshift64::new(REBUILD_SEED);
        for i in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v), "next_f32() = {v} at iteration {i}");
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_f32_in_unit_interval_for_any_seed(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_f32();
                    prop_assert!((0.0..1.0).contains(&v), "next_f32() = {v} for seed {seed}");
                }
            }

            #[test]
            fn next_f32_approximate_uniformity(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                let mut buckets = [0u32; 10];
                for _ in 0..10_000 {
                    let idx = (rng.next_f32() * 10.0).min(9.0) as usize;
                    buckets[idx] += 1;
                }
                for (i, &count) in buckets.iter().enumerate() {
                    prop_assert!(count >= 500, "bucket {i} has only {count} for seed {seed}");
                }
            }
        }
    }
}
