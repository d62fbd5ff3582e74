pub mod metrics;

pub use metrics::*;

use crate::bptt::train_one_example_with;
use crate::config::{TrainConfig, TrainConfigError};
use crate::nn::{RecurrentNet, Sequence};
use crate::scenario::{self, Scenario, CANNED_SCENARIOS};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use std::{error::Error, fmt};

/// A labelled sequence: 1.0 if the hero wins, 0.0 if it loses.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingExample {
    pub name: String,
    pub sequence: Sequence,
    pub label: f64,
}

impl TrainingExample {
    /// Simulate the scenario's battle and pair the result with its label.
    pub fn from_scenario<R: Rng + ?Sized>(scenario: &Scenario, rng: &mut R) -> Self {
        let battle = scenario::simulate(&scenario.hero, &scenario.monster, rng);
        Self {
            name: scenario.name.to_string(),
            sequence: battle.sequence,
            label: scenario.label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainingInitError {
    Config(TrainConfigError),
    NoExamples,
    InvalidLabel { name: String, label: f64 },
}

impl fmt::Display for TrainingInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingInitError::Config(e) => write!(f, "{}", e),
            TrainingInitError::NoExamples => write!(f, "at least one training example is required"),
            TrainingInitError::InvalidLabel { name, label } => {
                write!(f, "example '{name}' has label {label}, expected 0.0 or 1.0")
            }
        }
    }
}

impl From<TrainConfigError> for TrainingInitError {
    fn from(err: TrainConfigError) -> Self {
        TrainingInitError::Config(err)
    }
}

impl Error for TrainingInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainingInitError::Config(e) => Some(e),
            _ => None,
        }
    }
}

/// Owns one net and the fixed examples it is drilled on.
pub struct TrainingRun {
    pub(crate) net: RecurrentNet,
    pub(crate) examples: Vec<TrainingExample>,
    pub(crate) config: TrainConfig,
}

impl TrainingRun {
    pub fn new(config: TrainConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Seed a ChaCha RNG from the config, initialize the net from it, then
    /// simulate the canned battles from the same stream.
    pub fn try_new(config: TrainConfig) -> Result<Self, TrainingInitError> {
        config.validate()?;
        let mut rng = ChaCha12Rng::seed_from_u64(config.seed);
        let net = RecurrentNet::random(&mut rng);
        let examples = CANNED_SCENARIOS
            .iter()
            .map(|scenario| TrainingExample::from_scenario(scenario, &mut rng))
            .collect();
        Self::from_parts(net, examples, config)
    }

    pub fn from_parts(
        net: RecurrentNet,
        examples: Vec<TrainingExample>,
        config: TrainConfig,
    ) -> Result<Self, TrainingInitError> {
        config.validate()?;
        if examples.is_empty() {
            return Err(TrainingInitError::NoExamples);
        }
        if let Some(bad) = examples.iter().find(|e| e.label != 0.0 && e.label != 1.0) {
            return Err(TrainingInitError::InvalidLabel {
                name: bad.name.clone(),
                label: bad.label,
            });
        }
        Ok(Self {
            net,
            examples,
            config,
        })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn net(&self) -> &RecurrentNet {
        &self.net
    }

    pub fn into_net(self) -> RecurrentNet {
        self.net
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    /// One pass over every example in order. Returns the summed squared error
    /// of the predictions made before each update.
    fn epoch(&mut self) -> f64 {
        let TrainConfig {
            learning_rate,
            backprop,
            ..
        } = self.config;
        let mut squared_error_sum = 0.0;
        for example in &self.examples {
            let predicted = train_one_example_with(
                &mut self.net,
                &example.sequence,
                example.label,
                learning_rate,
                backprop,
            );
            squared_error_sum += (example.label - predicted).powi(2);
        }
        squared_error_sum
    }

    /// Train for the configured number of epochs. No early stopping.
    pub fn run(&mut self) -> RunSummary {
        let epochs = self.config.epochs;
        let sample_every = self.config.sample_every;
        log::info!(
            "training {} epochs over {} examples (lr {}, {:?})",
            epochs,
            self.examples.len(),
            self.config.learning_rate,
            self.config.backprop
        );

        let mut samples = Vec::with_capacity(epochs / sample_every + 1);
        for epoch in 1..=epochs {
            let squared_error_sum = self.epoch();
            if epoch % sample_every == 0 || epoch == epochs {
                let metrics = self.collect_epoch_metrics(epoch, squared_error_sum);
                log::info!(
                    "epoch {}/{}: mse {:.6}",
                    epoch,
                    epochs,
                    metrics.mean_squared_error
                );
                samples.push(metrics);
            }
        }

        let final_predictions = self.collect_predictions();
        for p in &final_predictions {
            log::info!("{}: label {} -> p {:.4}", p.name, p.label, p.probability);
        }
        RunSummary {
            schema_version: 1,
            seed: self.config.seed,
            epochs,
            sample_every,
            learning_rate: self.config.learning_rate,
            backprop: self.config.backprop,
            samples,
            final_predictions,
        }
    }
}

/// Train one independent replica per seed in parallel. Replicas never share
/// parameters; each summary is exactly what a sequential run with that seed
/// would produce.
pub fn sweep(config: &TrainConfig, seeds: &[u64]) -> Result<Vec<RunSummary>, TrainingInitError> {
    config.validate()?;
    Ok(seeds
        .par_iter()
        .map(|&seed| {
            let mut run = TrainingRun::new(TrainConfig {
                seed,
                ..config.clone()
            });
            run.run()
        })
        .collect())
}
