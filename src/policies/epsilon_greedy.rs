use super::errors::PolicyError;
use super::rng::{MaybeSeededRng, UniformSource};

use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Stored form of a bandit. Field names are kept stable for existing snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedySnapshot {
    pub epsilon: f64,
    pub counts: Vec<u64>,
    #[serde(rename = "values", alias = "rewards")]
    pub rewards: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArmStats {
    pub pulls: u64,
    pub mean_reward: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PolicyStats {
    pub epsilon: f64,
    pub seed: Option<u64>,
    pub arms: Vec<ArmStats>,
}

#[derive(Debug)]
struct Arms {
    counts: Vec<u64>,
    rewards: Vec<f64>,
}

impl Arms {
    fn zeroed(arm_count: usize) -> Result<Self, PolicyError> {
        if arm_count < 1 {
            return Err(PolicyError::InvalidArmCount(arm_count));
        }

        Ok(Self {
            counts: vec![0; arm_count],
            rewards: vec![0.0; arm_count],
        })
    }

    fn from_parts(counts: Vec<u64>, rewards: Vec<f64>) -> Result<Self, PolicyError> {
        if counts.len() != rewards.len() {
            return Err(PolicyError::MismatchedLengths {
                counts: counts.len(),
                rewards: rewards.len(),
            });
        }
        if counts.is_empty() {
            return Err(PolicyError::InvalidArmCount(0));
        }
        check_rewards(&rewards)?;

        Ok(Self { counts, rewards })
    }

    fn len(&self) -> usize {
        self.rewards.len()
    }

    fn check_update(&self, arm_id: usize, reward: f64) -> Result<(), PolicyError> {
        if arm_id >= self.len() {
            return Err(PolicyError::ArmIndexOutOfRange {
                arm_id,
                arm_count: self.len(),
            });
        }
        check_reward(reward)?;
        self.check_increment(arm_id, 1)
    }

    fn check_increment(&self, arm_id: usize, pulls: u64) -> Result<(), PolicyError> {
        match self.counts[arm_id].checked_add(pulls) {
            Some(_) => Ok(()),
            None => Err(PolicyError::ArmCountOverflow(arm_id)),
        }
    }

    // callers must have run check_update first
    fn apply_update(&mut self, arm_id: usize, reward: f64) {
        self.counts[arm_id] += 1;
        let n = self.counts[arm_id] as f64;

        let old_reward = self.rewards[arm_id];
        self.rewards[arm_id] = (old_reward * (n - 1.0) + reward) / n;
    }
}

fn check_reward(reward: f64) -> Result<(), PolicyError> {
    if reward.is_finite() && reward >= 0.0 {
        Ok(())
    } else {
        Err(PolicyError::InvalidReward(reward))
    }
}

fn check_rewards(rewards: &[f64]) -> Result<(), PolicyError> {
    rewards.iter().try_for_each(|&reward| check_reward(reward))
}

fn check_epsilon(epsilon: f64) -> Result<f64, PolicyError> {
    if (0.0..=1.0).contains(&epsilon) {
        Ok(epsilon)
    } else {
        Err(PolicyError::InvalidEpsilon(epsilon))
    }
}

// first maximum wins ties, Iterator::max_by would return the last one
fn best_arm(rewards: &[f64]) -> usize {
    rewards
        .iter()
        .enumerate()
        .fold(0, |best, (arm_id, &reward)| {
            if reward > rewards[best] {
                arm_id
            } else {
                best
            }
        })
}

/// Epsilon-greedy bandit over a fixed number of arms, shareable across threads.
///
/// Counts and mean rewards sit behind a single reader-writer lock: reads and
/// exploit scans take it shared, every mutation holds it exclusively for the
/// whole validate-read-compute-write sequence.
#[derive(Debug)]
pub struct EpsilonGreedy<R = MaybeSeededRng> {
    epsilon: f64,
    arms: RwLock<Arms>,
    rng: R,
}

impl EpsilonGreedy<MaybeSeededRng> {
    pub fn new(arm_count: usize, epsilon: f64, seed: Option<u64>) -> Result<Self, PolicyError> {
        Self::with_source(arm_count, epsilon, MaybeSeededRng::new(seed))
    }

    pub fn from_parts(
        epsilon: f64,
        counts: Vec<u64>,
        rewards: Vec<f64>,
        seed: Option<u64>,
    ) -> Result<Self, PolicyError> {
        Self::from_parts_with_source(epsilon, counts, rewards, MaybeSeededRng::new(seed))
    }

    pub fn from_snapshot(
        snapshot: EpsilonGreedySnapshot,
        seed: Option<u64>,
    ) -> Result<Self, PolicyError> {
        let EpsilonGreedySnapshot {
            epsilon,
            counts,
            rewards,
        } = snapshot;
        Self::from_parts(epsilon, counts, rewards, seed)
    }

    pub fn seed(&self) -> Option<u64> {
        self.rng.seed()
    }

    pub fn stats(&self) -> PolicyStats {
        let arms = self.read_arms();
        PolicyStats {
            epsilon: self.epsilon,
            seed: self.seed(),
            arms: arms
                .counts
                .iter()
                .zip(&arms.rewards)
                .map(|(&pulls, &mean_reward)| ArmStats { pulls, mean_reward })
                .collect(),
        }
    }
}

impl<R: UniformSource> EpsilonGreedy<R> {
    pub fn with_source(arm_count: usize, epsilon: f64, rng: R) -> Result<Self, PolicyError> {
        let epsilon = check_epsilon(epsilon)?;
        let arms = Arms::zeroed(arm_count)?;

        Ok(Self {
            epsilon,
            arms: RwLock::new(arms),
            rng,
        })
    }

    pub fn from_parts_with_source(
        epsilon: f64,
        counts: Vec<u64>,
        rewards: Vec<f64>,
        rng: R,
    ) -> Result<Self, PolicyError> {
        let epsilon = check_epsilon(epsilon)?;
        let arms = Arms::from_parts(counts, rewards)?;

        Ok(Self {
            epsilon,
            arms: RwLock::new(arms),
            rng,
        })
    }

    // every writer validates before mutating, so a poisoned lock still guards consistent arms
    fn read_arms(&self) -> RwLockReadGuard<'_, Arms> {
        self.arms.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_arms(&self) -> RwLockWriteGuard<'_, Arms> {
        self.arms.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn arm_count(&self) -> usize {
        self.read_arms().len()
    }

    /// Replace all arms with `arm_count` fresh ones. Epsilon is kept.
    pub fn initialize(&self, arm_count: usize) -> Result<(), PolicyError> {
        let arms = Arms::zeroed(arm_count)?;
        *self.write_arms() = arms;
        Ok(())
    }

    /// Select an arm using a draw from the internal source.
    pub fn select_arm(&self) -> usize {
        self.select_arm_with(self.rng.draw())
    }

    /// Select an arm for the given draw: exploit when `draw > epsilon`, explore otherwise.
    pub fn select_arm_with(&self, draw: f64) -> usize {
        if draw > self.epsilon {
            let rewards = self.read_arms().rewards.clone();
            best_arm(&rewards)
        } else {
            let arm_count = self.read_arms().len();
            self.rng.index(arm_count)
        }
    }

    /// Fold `reward` into the running mean of `arm_id`. The state is left untouched on error.
    pub fn update(&self, arm_id: usize, reward: f64) -> Result<(), PolicyError> {
        let mut arms = self.write_arms();
        arms.check_update(arm_id, reward)?;
        arms.apply_update(arm_id, reward);
        Ok(())
    }

    /// Apply all updates under one lock, or none of them if any is invalid.
    pub fn update_batch(&self, updates: &[(usize, f64)]) -> Result<(), PolicyError> {
        let mut arms = self.write_arms();
        let mut pulls = vec![0u64; arms.len()];
        updates.iter().try_for_each(|&(arm_id, reward)| {
            arms.check_update(arm_id, reward)?;
            // several updates may target the same arm
            pulls[arm_id] += 1;
            arms.check_increment(arm_id, pulls[arm_id])
        })?;
        updates
            .iter()
            .for_each(|&(arm_id, reward)| arms.apply_update(arm_id, reward));
        Ok(())
    }

    pub fn counts(&self) -> Vec<u64> {
        self.read_arms().counts.clone()
    }

    pub fn rewards(&self) -> Vec<f64> {
        self.read_arms().rewards.clone()
    }

    pub fn set_counts(&self, counts: Vec<u64>) -> Result<(), PolicyError> {
        let mut arms = self.write_arms();
        if counts.len() != arms.len() {
            return Err(PolicyError::MismatchedLengths {
                counts: counts.len(),
                rewards: arms.len(),
            });
        }
        arms.counts = counts;
        Ok(())
    }

    pub fn set_rewards(&self, rewards: Vec<f64>) -> Result<(), PolicyError> {
        let mut arms = self.write_arms();
        if rewards.len() != arms.len() {
            return Err(PolicyError::MismatchedLengths {
                counts: arms.len(),
                rewards: rewards.len(),
            });
        }
        check_rewards(&rewards)?;
        arms.rewards = rewards;
        Ok(())
    }

    /// Replace counts and rewards together. Both must match the current number of arms.
    pub fn set_arms(&self, counts: Vec<u64>, rewards: Vec<f64>) -> Result<(), PolicyError> {
        let mut arms = self.write_arms();
        let replacement = Arms::from_parts(counts, rewards)?;
        if replacement.len() != arms.len() {
            return Err(PolicyError::MismatchedLengths {
                counts: replacement.len(),
                rewards: arms.len(),
            });
        }
        *arms = replacement;
        Ok(())
    }

    pub fn snapshot(&self) -> EpsilonGreedySnapshot {
        let arms = self.read_arms();
        EpsilonGreedySnapshot {
            epsilon: self.epsilon,
            counts: arms.counts.clone(),
            rewards: arms.rewards.clone(),
        }
    }
}
