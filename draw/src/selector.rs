//! Winner selection: one participant, uniformly at random, from the pool.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use roster::model::Participant;

/// Source of randomness for the draw. Injected so that runs can be replayed.
pub trait RandomSource: Send {
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Seed for a reel's flicker sequence.
    fn next_seed(&mut self) -> u64;
}

/// OS-seeded thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn next_seed(&mut self) -> u64 {
        rand::thread_rng().next_u64()
    }
}

/// Deterministic generator for reproducible draws.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn next_seed(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

/// Pick the winner. `None` only for an empty pool, which callers are
/// expected to have ruled out already.
pub fn select_winner<'a>(
    pool: &'a [Participant],
    rng: &mut dyn RandomSource,
) -> Option<&'a Participant> {
    if pool.is_empty() {
        return None;
    }
    pool.get(rng.pick_index(pool.len()))
}
