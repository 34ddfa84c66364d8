use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("Invalid number of arms {0}, at least one arm is required")]
    InvalidArmCount(usize),
    #[error("Invalid epsilon {0}, expected a value in [0, 1]")]
    InvalidEpsilon(f64),
    #[error("Mismatched lengths: {counts} counts for {rewards} rewards")]
    MismatchedLengths { counts: usize, rewards: usize },
    #[error("Arm {arm_id} out of range for {arm_count} arms")]
    ArmIndexOutOfRange { arm_id: usize, arm_count: usize },
    #[error("Invalid reward {0}, rewards must be finite and non-negative")]
    InvalidReward(f64),
    #[error("Arm {0} cannot record more pulls")]
    ArmCountOverflow(usize),
}
