//! Random number generation, on top of the "rand" crate and a xoshiro engine
//! whose jump function provides independent streams for event batches

use crate::numeric::Float;
use rand::{distributions::Distribution, Rng, SeedableRng};

// Select random number generation engine in use
#[cfg(feature = "f32")]
type Engine = rand_xoshiro::Xoshiro128Plus;
#[cfg(not(feature = "f32"))]
type Engine = rand_xoshiro::Xoshiro256Plus;

/// Random number generator of the toy event source
#[derive(Clone, Debug, PartialEq)]
pub struct RandomGenerator {
    rng: Engine,
}
//
impl RandomGenerator {
    /// Spawn a new random number generator
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Engine::seed_from_u64(seed),
        }
    }

    /// Generate a random floating-point number between 0 and 1
    pub fn random(&mut self) -> Float {
        self.rng.gen()
    }

    /// Draw a value from some probability distribution
    pub fn sample<T>(&mut self, distribution: &impl Distribution<T>) -> T {
        distribution.sample(&mut self.rng)
    }

    /// Move to a state which is far enough that the generated sequences will
    /// not overlap with those of the previous state
    pub fn jump(&mut self) {
        self.rng.jump();
    }
}
