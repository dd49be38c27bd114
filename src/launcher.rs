//! Launcher for an embedded binary
//!
//! Wraps one payload. The first successful call materializes it and stores
//! the resulting path; every later call on the same launcher reuses that
//! path without touching the cache again, even if the file has since been
//! removed. A failed call stores nothing, so the next call retries.
//!
//! # Example
//!
//! ```rust,ignore
//! static TOOL: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/tool"));
//!
//! let launcher = Launcher::new("tool", TOOL);
//! let output = launcher
//!     .command(CancellationToken::new(), ["--version"])?
//!     .output()
//!     .await?;
//! ```

use crate::error::{EmbedbinError, EmbedbinResult};
use crate::materialize::{Materialize, Materializer, Payload, DEFAULT_MODE};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::OnceLock;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Materializes one embedded binary on demand and builds commands for it
#[derive(Debug)]
pub struct Launcher<M = Materializer> {
    name: String,
    bytes: Cow<'static, [u8]>,
    mode: u32,
    materializer: M,
    resolved: OnceLock<PathBuf>,
}

impl Launcher<Materializer> {
    /// Create a launcher that caches under the platform temp directory
    pub fn new(name: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) -> Self {
        Self::with_materializer(name, bytes, Materializer::default())
    }
}

impl<M: Materialize> Launcher<M> {
    /// Create a launcher backed by a specific materializer
    pub fn with_materializer(
        name: impl Into<String>,
        bytes: impl Into<Cow<'static, [u8]>>,
        materializer: M,
    ) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            mode: DEFAULT_MODE,
            materializer,
            resolved: OnceLock::new(),
        }
    }

    /// Set the permission mode used when materializing
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Logical name of the binary
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path stored by an earlier successful resolve, if any
    pub fn resolved_path(&self) -> Option<&Path> {
        self.resolved.get().map(|p| p.as_path())
    }

    /// Materialize the binary on first use and return its path
    pub fn resolve(&self) -> EmbedbinResult<&Path> {
        if let Some(path) = self.resolved.get() {
            return Ok(path.as_path());
        }

        let payload = Payload {
            name: &self.name,
            bytes: &self.bytes,
            mode: self.mode,
        };
        let materialized = self
            .materializer
            .ensure_file(&payload)
            .map_err(|e| EmbedbinError::Resolve {
                name: self.name.clone(),
                source: Box::new(e),
            })?;
        debug!(
            "Resolved {} to {} ({})",
            self.name,
            materialized.path.display(),
            materialized.outcome
        );

        // Racing first callers both materialize; the first stored path wins
        Ok(self.resolved.get_or_init(|| materialized.path).as_path())
    }

    /// Build a command for the binary without running it
    ///
    /// The token only governs the process run through the returned
    /// [`EmbeddedCommand`]; materialization itself is not cancellable.
    pub fn command<I, S>(
        &self,
        cancel: CancellationToken,
        args: I,
    ) -> EmbedbinResult<EmbeddedCommand>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let path = self.resolve()?;

        let mut command = Command::new(path);
        command.args(args).kill_on_drop(true);

        Ok(EmbeddedCommand {
            name: self.name.clone(),
            command,
            cancel,
        })
    }
}

/// A command bound to a materialized binary and a cancellation token
#[derive(Debug)]
pub struct EmbeddedCommand {
    name: String,
    command: Command,
    cancel: CancellationToken,
}

impl EmbeddedCommand {
    /// Configure stdio, environment or working directory before running
    pub fn as_command_mut(&mut self) -> &mut Command {
        &mut self.command
    }

    /// Path of the program this command runs
    pub fn path(&self) -> &Path {
        Path::new(self.command.as_std().get_program())
    }

    /// Token that aborts `output` and `status`
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run to completion, capturing stdout and stderr
    ///
    /// The child is killed if the token is cancelled first.
    pub async fn output(mut self) -> EmbedbinResult<Output> {
        let description = self.describe();
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(EmbedbinError::Cancelled { name: self.name }),
            result = self.command.output() => {
                result.map_err(|e| EmbedbinError::command_failed(description, e))
            }
        }
    }

    /// Run to completion with the configured stdio
    ///
    /// The child is killed if the token is cancelled first.
    pub async fn status(mut self) -> EmbedbinResult<ExitStatus> {
        let description = self.describe();
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(EmbedbinError::Cancelled { name: self.name }),
            result = self.command.status() => {
                result.map_err(|e| EmbedbinError::command_failed(description, e))
            }
        }
    }

    /// Start the process and hand it to the caller
    ///
    /// The child is killed when dropped; watching the token is up to the caller.
    pub fn spawn(mut self) -> EmbedbinResult<Child> {
        let description = self.describe();
        self.command
            .spawn()
            .map_err(|e| EmbedbinError::command_failed(description, e))
    }

    /// Give up the wrapper
    pub fn into_parts(self) -> (Command, CancellationToken) {
        (self.command, self.cancel)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.name, self.path().display())
    }
}
