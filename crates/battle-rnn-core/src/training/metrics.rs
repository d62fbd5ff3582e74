use super::TrainingRun;
use crate::bptt::BackpropMode;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExamplePrediction {
    pub name: String,
    pub label: f64,
    pub probability: f64,
}

impl ExamplePrediction {
    /// True when the probability sits on the label's side of 0.5.
    pub fn is_separated(&self) -> bool {
        if self.label >= 0.5 {
            self.probability > 0.5
        } else {
            self.probability < 0.5
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EpochMetrics {
    pub epoch: usize,
    /// Mean of `(label - p)^2` over the predictions made while training this epoch.
    pub mean_squared_error: f64,
    pub predictions: Vec<ExamplePrediction>,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub seed: u64,
    pub epochs: usize,
    pub sample_every: usize,
    pub learning_rate: f64,
    pub backprop: BackpropMode,
    pub samples: Vec<EpochMetrics>,
    pub final_predictions: Vec<ExamplePrediction>,
}

impl RunSummary {
    /// Every canned example lands on the correct side of 0.5.
    pub fn separates(&self) -> bool {
        !self.final_predictions.is_empty()
            && self.final_predictions.iter().all(ExamplePrediction::is_separated)
    }
}

impl TrainingRun {
    pub(crate) fn collect_predictions(&mut self) -> Vec<ExamplePrediction> {
        let net = &mut self.net;
        self.examples
            .iter()
            .map(|example| ExamplePrediction {
                name: example.name.clone(),
                label: example.label,
                probability: net.forward(&example.sequence),
            })
            .collect()
    }

    pub(crate) fn collect_epoch_metrics(&mut self, epoch: usize, squared_error_sum: f64) -> EpochMetrics {
        let denom = self.examples.len().max(1) as f64;
        EpochMetrics {
            epoch,
            mean_squared_error: squared_error_sum / denom,
            predictions: self.collect_predictions(),
        }
    }
}
