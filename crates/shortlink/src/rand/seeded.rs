use crate::RandSource;
use parking_lot::Mutex;
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// A `RandSource` backed by a seeded [`StdRng`].
///
/// Two sources built from the same seed yield the same sequence, which makes
/// allocations reproducible in tests and simulations. The generator sits
/// behind a mutex so one source can be shared by concurrent allocations; the
/// interleaving of those allocations decides who sees which value.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandSource<u64> for SeededRandom {
    fn rand(&self) -> u64 {
        self.rng.lock().next_u64()
    }
}
