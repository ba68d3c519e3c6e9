//! simsync CLI entry point.

use anyhow::Context;
use clap::Parser;

use simsync::cli::{commands, handle_error, CliContext, Cli, Commands};
use simsync::infrastructure::config::ConfigLoader;
use simsync::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ConfigLoader::load_with(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
        ConfigLoader::validate(&config)?;
    }

    let log_config = LogConfig::try_from(&config.logging)?;
    let _logger = LoggerImpl::init(&log_config).context("Failed to initialize logging")?;

    let ctx = CliContext::new(config)?;

    match cli.command {
        Commands::Health => commands::health::execute(&ctx, cli.json).await,
        Commands::Agent(args) => commands::agent::execute(args, &ctx, cli.json).await,
        Commands::Sim(args) => commands::simulation::execute(args, &ctx, cli.json).await,
    }
}
