mod cli;
mod commands;

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::commands::run_reproduce;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    eci_core::tracing::init_tracing();

    match cli.command {
        Command::Reproduce(args) => {
            run_reproduce(&args.input, &args.output, args.smoke, &args.overrides)
        }
        Command::Smoke(args) => run_reproduce(&args.run_dir, &args.output_dir, true, &args.overrides),
    }
}
