//! relay - plugin-driven command runner
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use relay::cli::{self, commands, Cli, Commands};
use relay::config::{ConfigManager, Settings, SettingsOverrides};
use relay::error::RelayResult;
use relay::exec::launcher::process_exit_code;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => process_exit_code(code),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            debug!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> RelayResult<i32> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config.general.log_format);
    debug!("Loaded config from {}", config_manager.path().display());

    let overrides = SettingsOverrides {
        target_path: cli.target_path,
        home: cli.home,
    };
    let update_check = !cli.no_update_check;

    match cli.command {
        Commands::Completions { shell } => {
            commands::completions(shell);
            Ok(0)
        }
        Commands::Config(args) => commands::config(args, &config_manager, &config)
            .await
            .map(|()| 0),
        Commands::Cache(args) => {
            let settings = Settings::resolve(&config, overrides)?;
            commands::cache(args, &settings).await.map(|()| 0)
        }
        Commands::Init(args) => {
            let settings = Settings::resolve(&config, overrides)?;
            commands::exec(args.into_invocation(), settings, &config, update_check).await
        }
        Commands::External(argv) => {
            let invocation = cli::parse_external(argv)?;
            let settings = Settings::resolve(&config, overrides)?;
            commands::exec(invocation, settings, &config, update_check).await
        }
    }
}

/// 0 = warn (spinners only), 1 = info, 2+ = debug. Logs go to stderr.
fn init_logging(verbose: u8, format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("relay=warn"),
        1 => EnvFilter::new("relay=info"),
        _ => EnvFilter::new("relay=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
