use clap::{Args, Parser, Subcommand};
use eci_core::config::CliOverrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "eci",
    version = env!("CARGO_PKG_VERSION"),
    about = "Epistemic Collapse Index: estimate, residualize and evaluate over a run directory."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full evaluation and write eci_results.csv and report.json
    Reproduce(ReproduceArgs),
    /// Fast run over a seeded subsample
    Smoke(SmokeArgs),
}

#[derive(Args, Debug)]
pub struct ReproduceArgs {
    /// Run directory holding the metric tables and manifest.json
    #[arg(long = "in", value_name = "DIR", default_value = "runs/affordable", value_hint = clap::ValueHint::DirPath)]
    pub input: PathBuf,

    /// Output directory
    #[arg(long = "out", value_name = "DIR", default_value = "runs/affordable/results", value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,

    /// Evaluate a seeded subsample only
    #[arg(long)]
    pub smoke: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Args, Debug)]
pub struct SmokeArgs {
    #[arg(long = "run-dir", value_name = "DIR", default_value = "runs/affordable")]
    pub run_dir: PathBuf,

    #[arg(long = "output-dir", value_name = "DIR", default_value = "results/smoke")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Flags that take precedence over every config layer.
#[derive(Args, Debug, Default, Clone)]
pub struct OverrideArgs {
    /// Bootstrap seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Bootstrap iterations
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Window length in tokens
    #[arg(long)]
    pub window_length: Option<usize>,

    /// Window stride in tokens
    #[arg(long)]
    pub stride: Option<usize>,

    /// Worker threads (0 = all cores)
    #[arg(long)]
    pub threads: Option<usize>,
}

impl OverrideArgs {
    pub fn to_overrides(&self) -> CliOverrides {
        CliOverrides {
            seed: self.seed,
            bootstrap_iterations: self.iterations,
            window_length: self.window_length,
            stride: self.stride,
            threads: self.threads,
        }
    }
}
