use crate::config::BanditConfig;
use crate::errors::RepositoryError;
use crate::policies::{EpsilonGreedy, EpsilonGreedySnapshot, PolicyStats};

use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Bandits served by this process, keyed by experiment id.
///
/// Each bandit synchronises its own arms, so draws and updates only need
/// shared access to the repository. Creating or removing experiments needs
/// exclusive access.
pub struct Repository {
    experiments: HashMap<Uuid, EpsilonGreedy>,
    bandit_config: BanditConfig,
}

impl Repository {
    pub fn new(bandit_config: BanditConfig) -> Self {
        Self {
            experiments: HashMap::new(),
            bandit_config,
        }
    }

    fn get_experiment(&self, experiment_id: Uuid) -> Result<&EpsilonGreedy, RepositoryError> {
        self.experiments
            .get(&experiment_id)
            .ok_or(RepositoryError::ExperimentNotFound(experiment_id))
    }

    pub fn list_experiments(&self) -> Vec<Uuid> {
        self.experiments.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        info!(num_experiments = %self.experiments.len(), "Clearing experiments");
        self.experiments.clear();
    }

    pub fn create_experiment(
        &mut self,
        arm_count: usize,
        epsilon: Option<f64>,
        seed: Option<u64>,
    ) -> Result<Uuid, RepositoryError> {
        let epsilon = epsilon.unwrap_or(self.bandit_config.default_epsilon);
        let policy = EpsilonGreedy::new(arm_count, epsilon, seed.or(self.bandit_config.seed))?;

        let experiment_id = Uuid::new_v4();
        self.experiments.insert(experiment_id, policy);
        info!(id = %experiment_id, arm_count, epsilon, "Created experiment");

        Ok(experiment_id)
    }

    pub fn restore_experiment(
        &mut self,
        snapshot: EpsilonGreedySnapshot,
        seed: Option<u64>,
    ) -> Result<Uuid, RepositoryError> {
        let policy = EpsilonGreedy::from_snapshot(snapshot, seed.or(self.bandit_config.seed))?;

        let experiment_id = Uuid::new_v4();
        info!(id = %experiment_id, arm_count = policy.arm_count(), "Restored experiment");
        self.experiments.insert(experiment_id, policy);

        Ok(experiment_id)
    }

    pub fn delete_experiment(&mut self, experiment_id: Uuid) -> Result<(), RepositoryError> {
        self.experiments
            .remove(&experiment_id)
            .ok_or(RepositoryError::ExperimentNotFound(experiment_id))?;
        info!(id = %experiment_id, "Deleted experiment");
        Ok(())
    }

    /// Zero every arm, optionally changing how many arms the experiment has.
    pub fn reset_experiment(
        &self,
        experiment_id: Uuid,
        arm_count: Option<usize>,
    ) -> Result<(), RepositoryError> {
        let policy = self.get_experiment(experiment_id)?;
        let arm_count = arm_count.unwrap_or_else(|| policy.arm_count());
        policy.initialize(arm_count)?;
        info!(id = %experiment_id, arm_count, "Reset experiment");
        Ok(())
    }

    pub fn draw_experiment(
        &self,
        experiment_id: Uuid,
        draw: Option<f64>,
    ) -> Result<usize, RepositoryError> {
        let policy = self.get_experiment(experiment_id)?;
        let arm_id = match draw {
            Some(draw) => policy.select_arm_with(draw),
            None => policy.select_arm(),
        };
        debug!(id = %experiment_id, arm_id, "Drew arm");
        Ok(arm_id)
    }

    pub fn update_experiment(
        &self,
        experiment_id: Uuid,
        arm_id: usize,
        reward: f64,
    ) -> Result<(), RepositoryError> {
        self.get_experiment(experiment_id)?.update(arm_id, reward)?;
        debug!(id = %experiment_id, arm_id, reward, "Updated arm");
        Ok(())
    }

    pub fn batch_update_experiment(
        &self,
        experiment_id: Uuid,
        updates: &[(usize, f64)],
    ) -> Result<(), RepositoryError> {
        self.get_experiment(experiment_id)?.update_batch(updates)?;
        debug!(id = %experiment_id, num_updates = updates.len(), "Updated arms");
        Ok(())
    }

    pub fn experiment_stats(&self, experiment_id: Uuid) -> Result<PolicyStats, RepositoryError> {
        Ok(self.get_experiment(experiment_id)?.stats())
    }

    pub fn experiment_state(
        &self,
        experiment_id: Uuid,
    ) -> Result<EpsilonGreedySnapshot, RepositoryError> {
        Ok(self.get_experiment(experiment_id)?.snapshot())
    }

    /// Overwrite counts and/or mean rewards of an experiment. Lengths must match its arms.
    pub fn set_experiment_state(
        &self,
        experiment_id: Uuid,
        counts: Option<Vec<u64>>,
        rewards: Option<Vec<f64>>,
    ) -> Result<(), RepositoryError> {
        let policy = self.get_experiment(experiment_id)?;
        match (counts, rewards) {
            (Some(counts), Some(rewards)) => policy.set_arms(counts, rewards)?,
            (Some(counts), None) => policy.set_counts(counts)?,
            (None, Some(rewards)) => policy.set_rewards(rewards)?,
            (None, None) => {}
        }
        info!(id = %experiment_id, "Overwrote experiment state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::errors::PolicyError;

    const EPSILON: f64 = 0.1;
    const DEFAULT_SEED: Option<u64> = Some(1234);

    fn make_repository() -> Repository {
        Repository::new(BanditConfig {
            default_epsilon: EPSILON,
            seed: DEFAULT_SEED,
        })
    }

    #[test]
    fn create_experiment() {
        let mut repository = make_repository();
        let experiment_id = repository.create_experiment(3, None, None).unwrap();

        assert_eq!(repository.list_experiments(), vec![experiment_id]);
        let stats = repository.experiment_stats(experiment_id).unwrap();
        assert_eq!(stats.epsilon, EPSILON);
        assert_eq!(stats.seed, DEFAULT_SEED);
        assert_eq!(stats.arms.len(), 3);

        let experiment_id = repository.create_experiment(2, Some(0.5), Some(7)).unwrap();
        let stats = repository.experiment_stats(experiment_id).unwrap();
        assert_eq!(stats.epsilon, 0.5);
        assert_eq!(stats.seed, Some(7));
    }

    #[test]
    fn create_experiment_rejects_invalid_parameters() {
        let mut repository = make_repository();

        assert!(matches!(
            repository.create_experiment(0, None, None),
            Err(RepositoryError::Policy(PolicyError::InvalidArmCount(0)))
        ));
        assert!(matches!(
            repository.create_experiment(2, Some(-0.01), None),
            Err(RepositoryError::Policy(PolicyError::InvalidEpsilon(_)))
        ));
        assert!(repository.list_experiments().is_empty());
    }

    #[test]
    fn manages_experiment_lifecycle() {
        let mut repository = make_repository();
        let experiment_id = repository.create_experiment(2, Some(0.0), None).unwrap();

        repository.update_experiment(experiment_id, 1, 2.0).unwrap();
        repository
            .batch_update_experiment(experiment_id, &[(1, 1.0), (0, 0.5)])
            .unwrap();

        let state = repository.experiment_state(experiment_id).unwrap();
        assert_eq!(state.counts, vec![1, 2]);
        assert_eq!(state.rewards, vec![0.5, 1.5]);
        assert_eq!(repository.draw_experiment(experiment_id, Some(1.0)).unwrap(), 1);

        repository.reset_experiment(experiment_id, None).unwrap();
        let state = repository.experiment_state(experiment_id).unwrap();
        assert_eq!(state.counts, vec![0, 0]);
        assert_eq!(state.rewards, vec![0.0, 0.0]);

        repository.reset_experiment(experiment_id, Some(4)).unwrap();
        assert_eq!(repository.experiment_stats(experiment_id).unwrap().arms.len(), 4);

        repository.delete_experiment(experiment_id).unwrap();
        assert!(repository.list_experiments().is_empty());
        assert!(matches!(
            repository.delete_experiment(experiment_id),
            Err(RepositoryError::ExperimentNotFound(id)) if id == experiment_id
        ));
    }

    #[test]
    fn unknown_experiment() {
        let repository = make_repository();
        let experiment_id = Uuid::new_v4();

        assert!(matches!(
            repository.draw_experiment(experiment_id, None),
            Err(RepositoryError::ExperimentNotFound(_))
        ));
        assert!(matches!(
            repository.update_experiment(experiment_id, 0, 1.0),
            Err(RepositoryError::ExperimentNotFound(_))
        ));
        assert!(matches!(
            repository.experiment_state(experiment_id),
            Err(RepositoryError::ExperimentNotFound(_))
        ));
    }

    #[test]
    fn failed_update_leaves_state_unchanged() {
        let mut repository = make_repository();
        let experiment_id = repository.create_experiment(2, None, None).unwrap();
        repository.update_experiment(experiment_id, 0, 1.0).unwrap();

        assert!(repository.update_experiment(experiment_id, 2, 1.0).is_err());
        assert!(repository.update_experiment(experiment_id, 0, -1.0).is_err());
        assert!(repository
            .batch_update_experiment(experiment_id, &[(0, 1.0), (5, 1.0)])
            .is_err());
        assert!(repository.reset_experiment(experiment_id, Some(0)).is_err());

        let state = repository.experiment_state(experiment_id).unwrap();
        assert_eq!(state.counts, vec![1, 0]);
        assert_eq!(state.rewards, vec![1.0, 0.0]);
    }

    #[test]
    fn restore_and_overwrite_state() {
        let mut repository = make_repository();
        let snapshot = EpsilonGreedySnapshot {
            epsilon: 0.3,
            counts: vec![4, 6],
            rewards: vec![0.25, 0.5],
        };

        let experiment_id = repository.restore_experiment(snapshot.clone(), None).unwrap();
        assert_eq!(repository.experiment_state(experiment_id).unwrap(), snapshot);

        repository
            .set_experiment_state(experiment_id, Some(vec![1, 1]), None)
            .unwrap();
        repository
            .set_experiment_state(experiment_id, None, Some(vec![0.9, 0.1]))
            .unwrap();
        let state = repository.experiment_state(experiment_id).unwrap();
        assert_eq!(state.counts, vec![1, 1]);
        assert_eq!(state.rewards, vec![0.9, 0.1]);

        assert!(matches!(
            repository.set_experiment_state(experiment_id, Some(vec![1, 2, 3]), Some(vec![0.0; 3])),
            Err(RepositoryError::Policy(PolicyError::MismatchedLengths { .. }))
        ));

        let invalid = EpsilonGreedySnapshot {
            epsilon: 0.3,
            counts: vec![4],
            rewards: vec![0.25, 0.5],
        };
        assert!(repository.restore_experiment(invalid, None).is_err());
    }

    #[test]
    fn clear() {
        let mut repository = make_repository();
        (0..3).for_each(|_| {
            repository.create_experiment(2, None, None).unwrap();
        });
        assert_eq!(repository.list_experiments().len(), 3);

        repository.clear();
        assert!(repository.list_experiments().is_empty());
    }
}
