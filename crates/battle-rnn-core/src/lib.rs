//! Recurrent win-probability model for turn-based duels.
//!
//! `nn` holds the fixed-topology parameters and the forward pass, `bptt`
//! trains them one labelled sequence at a time, and `scenario` turns two
//! attribute vectors into the sequence the net consumes.

pub mod activation;
pub mod bptt;
pub mod config;
pub mod nn;
pub mod scenario;
pub mod training;
pub mod verdict;

pub use bptt::{train_one_example, train_one_example_with, BackpropMode};
pub use config::{TrainConfig, TrainConfigError};
pub use nn::{RecurrentNet, Sequence, NUM_HIDDEN, NUM_INPUTS, NUM_OUTPUTS, SEQ_LEN};
pub use scenario::{simulate, Attributes, Battle};
pub use training::{sweep, RunSummary, TrainingExample, TrainingInitError, TrainingRun};
pub use verdict::Verdict;
