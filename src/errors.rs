use crate::policies::errors::PolicyError;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Experiment {0} not found")]
    ExperimentNotFound(Uuid),
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
