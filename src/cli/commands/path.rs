//! Path command - print where a binary would be cached

use super::read_binary;
use crate::cli::args::{default_name, PathArgs};
use crate::config::Config;
use crate::error::EmbedbinResult;
use crate::materialize::{key, Materializer};

/// Execute the path command
pub async fn execute(args: PathArgs, config: &Config) -> EmbedbinResult<()> {
    let name = args.name.unwrap_or_else(|| default_name(&args.file));
    key::validate_name(&name)?;
    let bytes = read_binary(&args.file).await?;

    let materializer = Materializer::from_config(&config.cache);
    println!("{}", materializer.canonical_path(&name, &bytes).display());
    Ok(())
}
