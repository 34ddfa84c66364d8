pub mod epsilon_greedy;
pub mod errors;
mod rng;

pub use epsilon_greedy::{ArmStats, EpsilonGreedy, EpsilonGreedySnapshot, PolicyStats};
pub use rng::{MaybeSeededRng, UniformSource};
