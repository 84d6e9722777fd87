//! Shared randomness helpers.
//!
//! Every engine run owns its own seeded generator; nothing in here touches
//! global state. The helpers use rejection sampling on purpose: the operator
//! semantics (random initialization, tournament position draws, interval
//! draws) are defined in terms of it.

use rand::Rng;

/// Uniform draw from `[0, max)` skipping indices marked in `used`.
/// Precondition: at least one index is unused.
pub fn random_excluding<R: Rng>(rng: &mut R, max: usize, used: &[bool]) -> usize {
    loop {
        let value = rng.gen_range(0..max);
        if !used[value] {
            return value;
        }
    }
}

/// A closed index range `[lo, hi]` with `lo < hi`, used to pick the
/// contiguous subsequence a crossover or mutation operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub lo: usize,
    pub hi: usize,
}

impl Interval {
    /// Draw a fresh interval over `[0, max)`: two distinct positions,
    /// redrawn until they are in increasing order. Precondition: `max >= 2`.
    pub fn random<R: Rng>(rng: &mut R, max: usize) -> Interval {
        loop {
            let first = rng.gen_range(0..max);
            let second = loop {
                let value = rng.gen_range(0..max);
                if value != first {
                    break value;
                }
            };
            if first < second {
                return Interval {
                    lo: first,
                    hi: second,
                };
            }
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.lo && index <= self.hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_excluding_skips_used() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let used = vec![true, false, true, true];
        for _ in 0..50 {
            assert_eq!(random_excluding(&mut rng, 4, &used), 1);
        }
    }

    #[test]
    fn test_interval_is_ordered_and_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            let iv = Interval::random(&mut rng, 10);
            assert!(iv.lo < iv.hi);
            assert!(iv.hi < 10);
        }
    }

    #[test]
    fn test_interval_on_two_elements() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let iv = Interval::random(&mut rng, 2);
        assert_eq!(iv, Interval { lo: 0, hi: 1 });
        assert!(iv.contains(0) && iv.contains(1) && !iv.contains(2));
    }
}
