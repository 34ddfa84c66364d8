use crate::policies::EpsilonGreedySnapshot;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct CreatePayload {
    pub arms: usize,
    pub epsilon: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RestorePayload {
    pub state: EpsilonGreedySnapshot,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResetPayload {
    pub arms: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DrawQuery {
    pub draw: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdatePayload {
    pub arm_id: usize,
    pub reward: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateBatchPayload {
    pub updates: Vec<UpdatePayload>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SetStatePayload {
    pub counts: Option<Vec<u64>>,
    #[serde(rename = "values", alias = "rewards")]
    pub rewards: Option<Vec<f64>>,
}
