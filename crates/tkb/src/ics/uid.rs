//! Event identifier sources.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Hands out one UID per exported event.
pub trait UidSource {
    fn next_uid(&mut self) -> String;
}

/// 128-bit random identifiers rendered as 32 lowercase hex digits.
pub struct RandomUids<R = ThreadRng> {
    rng: R,
}

impl RandomUids<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl RandomUids<StdRng> {
    /// Reproducible identifiers, for comparing exports byte for byte.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomUids<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> UidSource for RandomUids<R> {
    fn next_uid(&mut self) -> String {
        format!("{:032x}", self.rng.gen::<u128>())
    }
}
