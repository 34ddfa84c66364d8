use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Source of the uniform draws a policy needs to decide between exploring and exploiting.
pub trait UniformSource: Send + Sync {
    /// Uniform draw in `[0, 1)`.
    fn draw(&self) -> f64;

    /// Uniform index in `[0, n)`. Callers guarantee `n >= 1`.
    fn index(&self, n: usize) -> usize;
}

#[derive(Debug)]
pub struct MaybeSeededRng {
    seed: Option<u64>,
    rng: Mutex<SmallRng>,
}

impl MaybeSeededRng {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = if let Some(seed) = seed {
            SmallRng::seed_from_u64(seed)
        } else {
            SmallRng::from_os_rng()
        };

        Self {
            seed,
            rng: Mutex::new(rng),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut SmallRng) -> T) -> T {
        // a panic while holding the guard cannot leave the generator in an invalid state
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

impl UniformSource for MaybeSeededRng {
    fn draw(&self) -> f64 {
        self.with_rng(|rng| rng.random::<f64>())
    }

    fn index(&self, n: usize) -> usize {
        self.with_rng(|rng| rng.random_range(0..n))
    }
}
