use crate::shell::Shell;
use anyhow::{bail, Context, Result};
use battle_rnn_core::scenario::{self, Attributes, ATTRIBUTE_COUNT};
use battle_rnn_core::training::{sweep, TrainingRun};
use battle_rnn_core::{BackpropMode, TrainConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "battle-rnn",
    version,
    about = "Train a small recurrent net on simulated duels, then ask it who wins."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub train: TrainArgs,

    /// Log every simulated turn and more training detail.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Train, then predict matchups entered at the prompt (default).
    Play,
    /// Train and print the run summary as JSON.
    Train,
    /// Train one independent replica per seed in parallel.
    Sweep {
        /// Number of replicas.
        #[arg(long, default_value_t = 8)]
        replicas: u64,
    },
    /// Run the duel simulator only and print what the net would see.
    Simulate {
        /// HP,Mana,Strength,Intelligence,Defense,MagicDefense
        #[arg(long, value_parser = parse_attributes, allow_hyphen_values = true)]
        hero: Attributes,
        #[arg(long, value_parser = parse_attributes, allow_hyphen_values = true)]
        monster: Attributes,
    },
}

#[derive(Args, Debug, Default)]
pub struct TrainArgs {
    /// JSON file with training settings; flags below override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub epochs: Option<usize>,
    #[arg(long, global = true)]
    pub learning_rate: Option<f64>,
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    #[arg(long, global = true, value_enum)]
    pub backprop: Option<BackpropArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackpropArg {
    InPlace,
    Snapshot,
}

impl From<BackpropArg> for BackpropMode {
    fn from(arg: BackpropArg) -> Self {
        match arg {
            BackpropArg::InPlace => BackpropMode::InPlace,
            BackpropArg::Snapshot => BackpropMode::Snapshot,
        }
    }
}

impl TrainArgs {
    pub fn resolve(&self) -> Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str::<TrainConfig>(&raw)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => TrainConfig::default(),
        };
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(lr) = self.learning_rate {
            config.learning_rate = lr;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(backprop) = self.backprop {
            config.backprop = backprop.into();
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn parse_attributes(raw: &str) -> Result<Attributes, String> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in '{raw}': {e}"))?;
    let values: [f64; ATTRIBUTE_COUNT] = values.try_into().map_err(|v: Vec<f64>| {
        format!("expected {ATTRIBUTE_COUNT} comma-separated values, got {}", v.len())
    })?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(format!("attributes must be finite numbers: '{raw}'"));
    }
    Ok(Attributes::from(values))
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = self.train.resolve()?;
        match self.command.unwrap_or(Command::Play) {
            Command::Play => run_play(config),
            Command::Train => run_train(config),
            Command::Sweep { replicas } => run_sweep(config, replicas),
            Command::Simulate { hero, monster } => run_simulate(&config, &hero, &monster),
        }
    }
}

fn run_play(config: TrainConfig) -> Result<()> {
    println!("Training the duel model ({} epochs)...", config.epochs);
    let seed = config.seed;
    let mut run = TrainingRun::try_new(config)?;
    let summary = run.run();
    for p in &summary.final_predictions {
        println!("  {:<14} label {:.0}  p = {:.4}", p.name, p.label, p.probability);
    }
    if !summary.separates() {
        log::warn!("training did not separate the canned scenarios; predictions may be poor");
    }
    println!("Training complete.");

    let rng = ChaCha12Rng::seed_from_u64(seed.wrapping_add(1));
    Shell::new(run.into_net(), rng).run()
}

fn run_train(config: TrainConfig) -> Result<()> {
    let mut run = TrainingRun::try_new(config)?;
    let summary = run.run();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_sweep(config: TrainConfig, replicas: u64) -> Result<()> {
    if replicas == 0 {
        bail!("--replicas must be positive");
    }
    let seeds: Vec<u64> = (0..replicas).map(|i| config.seed.wrapping_add(i)).collect();
    let summaries = sweep(&config, &seeds)?;
    let separated = summaries.iter().filter(|s| s.separates()).count();
    log::info!("{separated}/{} replicas separate the canned scenarios", summaries.len());
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

fn run_simulate(config: &TrainConfig, hero: &Attributes, monster: &Attributes) -> Result<()> {
    let mut rng = ChaCha12Rng::seed_from_u64(config.seed);
    let battle = scenario::simulate(hero, monster, &mut rng);
    for turn in &battle.turns {
        println!("{turn}");
    }
    println!(
        "After {} turns -> hero HP {:.0} | monster HP {:.0}",
        battle.turns.len(),
        battle.hero_hp,
        battle.monster_hp
    );
    for (t, row) in battle.sequence.iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|x| format!("{x:.2}")).collect();
        println!("step {}: [{}]", t, cells.join(", "));
    }
    Ok(())
}
