//! Random number generation for subscriber sampling.
//!
//! RULE: Nothing in the engine may call a platform RNG directly.
//! All randomness flows through a SampleRng owned by the caller.
//!
//! Production runs draw from entropy, so samples are not reproducible.
//! Tests seed the generator to pin a sample down when they need to.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// Random source for one analysis run.
pub struct SampleRng {
    seed:  Option<u64>,
    inner: Pcg64Mcg,
}

impl SampleRng {
    /// Unseeded generator. Every run samples differently.
    pub fn from_entropy() -> Self {
        Self {
            seed:  None,
            inner: Pcg64Mcg::from_entropy(),
        }
    }

    /// Deterministic generator for tests and `--seed` replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed:  Some(seed),
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Draw `amount` distinct indices from `0..len`, returned in ascending order.
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        assert!(amount <= len, "amount must be <= len");
        let mut picked = rand::seq::index::sample(&mut self.inner, len, amount).into_vec();
        picked.sort_unstable();
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_samples_repeat() {
        let a = SampleRng::seeded(7).sample_indices(100, 10);
        let b = SampleRng::seeded(7).sample_indices(100, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn indices_are_distinct_and_sorted() {
        let picked = SampleRng::from_entropy().sample_indices(20, 20);
        assert_eq!(picked, (0..20).collect::<Vec<_>>());
    }
}
