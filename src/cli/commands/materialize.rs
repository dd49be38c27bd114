//! Materialize command - write a binary into the cache

use super::read_binary;
use crate::cli::args::MaterializeArgs;
use crate::config::Config;
use crate::error::EmbedbinResult;
use crate::materialize::{Materializer, Payload};
use tracing::info;

/// Execute the materialize command
pub async fn execute(args: MaterializeArgs, config: &Config) -> EmbedbinResult<()> {
    let name = args.binary.logical_name();
    let bytes = read_binary(&args.binary.file).await?;
    let mode = args.binary.mode.unwrap_or(config.cache.file_mode);

    let materializer = Materializer::from_config(&config.cache);
    let materialized = materializer.ensure_file(&Payload::new(&name, &bytes).with_mode(mode))?;

    info!("{}: {}", name, materialized.outcome);
    println!("{}", materialized.path.display());
    Ok(())
}
