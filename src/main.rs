//! Jobform CLI entry point.

use anyhow::Result;
use clap::Parser;

use jobform::cli::{commands, Cli, Commands};
use jobform::domain::models::Config;
use jobform::infrastructure::config::ConfigLoader;
use jobform::infrastructure::logging::LoggerImpl;

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli) {
        jobform::cli::handle_error(err, json);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let _logger = LoggerImpl::init(&config.logging)?;

    match cli.command {
        Commands::Validate(args) => commands::validate::execute(args, &config, cli.json),
        Commands::Path(args) => commands::path::execute(args, cli.json),
        Commands::Catalog(args) => commands::catalog::execute(args, &config, cli.json),
        Commands::Replay(args) => commands::replay::execute(args, &config, cli.json),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}
