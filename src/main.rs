//! Termfix CLI entry point.

use anyhow::Result;
use clap::Parser;

use termfix::cli::{commands, Cli, Commands};
use termfix::domain::models::Config;
use termfix::infrastructure::config::ConfigLoader;
use termfix::infrastructure::logging::LoggerImpl;

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => termfix::cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Evaluate(args) => commands::evaluate::execute(args, &config, cli.json).await,
        Commands::Selectors(args) => commands::selectors::execute(args, &config, cli.json).await,
        Commands::Config => commands::config::execute(&config, cli.json),
    };

    if let Err(err) = result {
        termfix::cli::handle_error(err, cli.json);
    }
}
