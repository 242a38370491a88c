use anyhow::Result;
use clap::Parser;

use hawker_opportunity::cli::{Cli, Commands};
use hawker_opportunity::commands::{config, rank, score};
use hawker_opportunity::telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose)?;
    match &cli.command {
        Commands::Score(args) => score::run(&cli, args),
        Commands::Rank(args) => rank::run(&cli, args),
        Commands::Config(command) => config::run(&cli, command),
    }
}
