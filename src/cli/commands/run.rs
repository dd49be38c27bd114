//! Run command - materialize a binary and execute it

use super::read_binary;
use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::error::{EmbedbinError, EmbedbinResult};
use crate::launcher::Launcher;
use crate::materialize::Materializer;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Execute the run command, passing the child's exit code through
pub async fn execute(args: RunArgs, config: &Config) -> EmbedbinResult<ExitCode> {
    let name = args.binary.logical_name();
    let bytes = read_binary(&args.binary.file).await?;
    let mode = args.binary.mode.unwrap_or(config.cache.file_mode);

    let materializer = Materializer::from_config(&config.cache);
    let launcher = Launcher::with_materializer(name.clone(), bytes, materializer).with_mode(mode);

    let cancel = CancellationToken::new();
    let command = launcher.command(cancel.clone(), &args.args)?;
    debug!("Executing: {} {:?}", command.path().display(), args.args);

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping {}", name);
            interrupt.cancel();
        }
    });

    let status = match command.status().await {
        Ok(status) => status,
        // Conventional exit code for SIGINT
        Err(EmbedbinError::Cancelled { .. }) => return Ok(ExitCode::from(130)),
        Err(e) => return Err(e),
    };
    let code = status.code().unwrap_or(1);
    debug!("{} exited with {}", launcher.name(), code);

    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}
