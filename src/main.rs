//! zero-coach CLI entry point.

use anyhow::Result;
use clap::Parser;

use zero_coach::cli::{commands, Cli, Commands};
use zero_coach::domain::models::Config;
use zero_coach::infrastructure::config::ConfigLoader;
use zero_coach::infrastructure::logging::LoggerImpl;

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => zero_coach::cli::handle_error(err, json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("warning: logging disabled: {err}");
            None
        }
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, config, json).await,
        Commands::Recommend(args) => commands::recommend::execute(args, config, json).await,
        Commands::Watch(args) => commands::watch::execute(args, config, json).await,
        Commands::Lock(args) => commands::lock::execute(args, config, json).await,
        Commands::Override(args) => commands::override_cmd::execute(args, config, json).await,
        Commands::Skip => commands::skip::execute(config, json).await,
        Commands::Leniency(args) => commands::leniency::execute(args, config, json).await,
        Commands::Attempt(args) => commands::attempt::execute(args, config, json).await,
        Commands::Targets(args) => commands::targets::execute(args, config, json).await,
    };

    if let Err(err) = result {
        zero_coach::cli::handle_error(err, json);
    }
}
