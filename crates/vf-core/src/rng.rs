//! Injectable randomness for the tick engine.
//!
//! The engine only ever asks one question of its random source: "give me a
//! uniform integer below `bound`".  That question is the [`Draw`] trait, so a
//! test can hand the engine a scripted source and replay a run exactly, while
//! production runs use the seeded [`SimRng`].
//!
//! # Determinism
//!
//! `SimRng` wraps a `SmallRng` seeded from a single `u64`.  With the same
//! seed, the same topology, and the same sequence of operator actions, two
//! runs produce identical flow states tick for tick.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

// ── Draw ──────────────────────────────────────────────────────────────────────

/// Source of bounded uniform integers.
pub trait Draw {
    /// Uniform integer in `[0, bound)`.  Returns `0` when `bound == 0`.
    fn below(&mut self, bound: u64) -> u64;

    /// Uniform integer in `[1, bound]`: `floor(random * bound) + 1`.
    #[inline]
    fn between_one_and(&mut self, bound: u64) -> u64 {
        self.below(bound) + 1
    }

    /// Uniform integer in the inclusive range `[lo, hi]`.
    ///
    /// `lo > hi` collapses to `lo`.
    fn inclusive(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        lo + self.below(hi - lo + 1)
    }
}

impl<D: Draw + ?Sized> Draw for &mut D {
    #[inline]
    fn below(&mut self, bound: u64) -> u64 {
        (**self).below(bound)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Seedable simulation RNG.  Used only from the single simulation thread.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }
}

impl Draw for SimRng {
    #[inline]
    fn below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.0.gen_range(0..bound)
    }
}
