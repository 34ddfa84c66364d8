//! Epsilon-greedy multi-armed bandits served over HTTP.
//!
//! The core lives in [`policies`]: [`policies::EpsilonGreedy`] keeps per-arm
//! pull counts and running mean rewards behind a reader-writer lock so a single
//! bandit can be drawn from and updated by many threads at once.

pub mod api;
pub mod config;
pub mod errors;
pub mod policies;
pub mod repository;
