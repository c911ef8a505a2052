//! Cache command - inspect installed packages

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Settings;
use crate::error::RelayResult;
use crate::package::{list_entries, CacheEntry};
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, settings: &Settings) -> RelayResult<()> {
    match args.action {
        CacheAction::List { format } => list_packages(settings, format),
        CacheAction::Path => {
            println!("{}", settings.store_dir().display());
            Ok(())
        }
    }
}

fn list_packages(settings: &Settings, format: OutputFormat) -> RelayResult<()> {
    let entries = list_entries(&settings.store_dir())?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}@{}", entry.name, entry.version);
            }
        }
        OutputFormat::Table if entries.is_empty() => println!("No cached packages found."),
        OutputFormat::Table => print_table(&entries),
    }

    Ok(())
}

fn print_table(entries: &[CacheEntry]) {
    println!("{:<40} {:<16} {:<20}", "PACKAGE", "VERSION", "INSTALLED");
    println!("{}", "-".repeat(76));

    for entry in entries {
        let installed = entry
            .installed_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<40} {:<16} {:<20}",
            entry.name,
            style(&entry.version).cyan(),
            installed
        );
    }

    println!();
    println!("Total: {} package(s)", entries.len());
}
