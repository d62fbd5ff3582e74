use crate::bptt::BackpropMode;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// One epoch trains every canned example once.
    pub epochs: usize,
    pub learning_rate: f64,
    pub seed: u64,
    /// Record run metrics every N epochs (the final epoch is always recorded).
    pub sample_every: usize,
    pub backprop: BackpropMode,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 20_000,
            learning_rate: 0.1,
            seed: 42,
            sample_every: 1_000,
            backprop: BackpropMode::InPlace,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainConfigError {
    InvalidLearningRate(f64),
    InvalidSampleEvery,
    TooManyEpochs { max: usize, actual: usize },
}

impl fmt::Display for TrainConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainConfigError::InvalidLearningRate(lr) => {
                write!(f, "learning_rate must be finite and positive (got {lr})")
            }
            TrainConfigError::InvalidSampleEvery => write!(f, "sample_every must be positive"),
            TrainConfigError::TooManyEpochs { max, actual } => {
                write!(f, "epochs ({actual}) exceed supported maximum ({max})")
            }
        }
    }
}

impl Error for TrainConfigError {}

impl TrainConfig {
    pub const MAX_EPOCHS: usize = 10_000_000;

    pub fn validate(&self) -> Result<(), TrainConfigError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.sample_every == 0 {
            return Err(TrainConfigError::InvalidSampleEvery);
        }
        if self.epochs > Self::MAX_EPOCHS {
            return Err(TrainConfigError::TooManyEpochs {
                max: Self::MAX_EPOCHS,
                actual: self.epochs,
            });
        }
        Ok(())
    }
}
