//! slicebuild - assemble build scripts from versioned slices
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use slicebuild::cli::{Cli, Commands};
use slicebuild::config::{Config, ConfigManager};
use slicebuild::error::SliceResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> SliceResult<()> {
    let cli = Cli::parse();
    slicebuild::ui::init_theme();

    // Completions don't need config loading
    if let Commands::Completions(args) = cli.command {
        slicebuild::cli::commands::completions(args);
        return Ok(());
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let mut config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    if let Some(root) = cli.root {
        debug!("Registry root overridden: {}", root.display());
        config.registry.root = root;
    }

    // Dispatch to command
    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Find(args) => slicebuild::cli::commands::find(args, &config).await,
        Commands::Make(args) => slicebuild::cli::commands::make(args, &config).await,
        Commands::Fetch(args) => slicebuild::cli::commands::fetch(args, &config).await,
        Commands::Test(args) => slicebuild::cli::commands::test(args, &config).await,
        Commands::Config(args) => {
            slicebuild::cli::commands::config(args, &config_manager, &config).await
        }
    }
}

/// 0 = warn (spinners only), 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let verbose = if config.general.verbose { verbose.max(1) } else { verbose };
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::new(format!("slicebuild={level},sb={level}"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
