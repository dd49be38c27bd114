//! Cache command - inspect the cache directory

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::EmbedbinResult;
use crate::materialize::{CachedBinary, EntryKind, Materializer};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> EmbedbinResult<()> {
    let materializer = Materializer::from_config(&config.cache);

    match args.action {
        CacheAction::Dir => {
            println!("{}", materializer.cache_dir().display());
            Ok(())
        }
        CacheAction::List { format } => list_binaries(&materializer, format),
    }
}

/// List all cached binaries
fn list_binaries(materializer: &Materializer, format: OutputFormat) -> EmbedbinResult<()> {
    let binaries = materializer.list()?;

    if binaries.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No cached binaries");
            }
        }
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_table(materializer, &binaries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&binaries)?),
        OutputFormat::Plain => {
            for binary in &binaries {
                println!("{}", binary.path.display());
            }
        }
    }

    Ok(())
}

fn print_table(materializer: &Materializer, binaries: &[CachedBinary]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Cached binaries");
    ui::key_value(&ctx, "Directory", &materializer.cache_dir().display().to_string());
    println!();

    println!(
        "{:<24} {:<14} {:<10} {:>12} {:<17}",
        style("NAME").bold(),
        style("DIGEST").bold(),
        style("KIND").bold(),
        style("SIZE").bold(),
        style("MODIFIED").bold()
    );
    println!("{}", "-".repeat(81));

    for binary in binaries {
        let kind = match binary.kind {
            EntryKind::Canonical => style(binary.kind).green().to_string(),
            EntryKind::Fallback => style(binary.kind).yellow().to_string(),
        };
        let modified = binary
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<24} {:<14} {:<10} {:>12} {:<17}",
            binary.name,
            &binary.digest[..12],
            kind,
            binary.size,
            modified
        );
    }

    let fallbacks = binaries.iter().filter(|b| b.kind == EntryKind::Fallback).count();
    println!();
    println!("Total: {} binary(ies), {} fallback", binaries.len(), fallbacks);
}
