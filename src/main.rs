//! embedbin - materialize and run cached executables
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use embedbin::cli::args::{ConfigAction, ConfigArgs};
use embedbin::cli::{commands, Cli, Commands};
use embedbin::config::{Config, ConfigManager};
use embedbin::error::EmbedbinResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> EmbedbinResult<ExitCode> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::locate(cli.config.clone());
    // Init must work even when the existing file is broken
    let mut config = match &cli.command {
        Commands::Config(ConfigArgs {
            action: Some(ConfigAction::Init { .. }),
        }) => Config::default(),
        _ => config_manager.load().await?,
    };

    init_logging(cli.verbose, &config);
    debug!("Loaded config from {}", config_manager.path().display());

    if let Some(root) = cli.cache_root {
        debug!("Cache root overridden: {}", root.display());
        config.cache.root = Some(root);
    }

    // Dispatch to command
    match cli.command {
        Commands::Run(args) => return commands::run(args, &config).await,
        Commands::Materialize(args) => commands::materialize(args, &config).await?,
        Commands::Path(args) => commands::path(args, &config).await?,
        Commands::Cache(args) => commands::cache(args, &config).await?,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Initialize logging: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("embedbin=warn"),
        1 => EnvFilter::new("embedbin=info"),
        _ => EnvFilter::new("embedbin=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
