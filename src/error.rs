//! Error types for embedbin
//!
//! All modules use `EmbedbinResult<T>` as their return type. Failures on a
//! single cache path are described by [`CacheFileError`]; the crate-level
//! [`EmbedbinError`] aggregates them.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for embedbin operations
pub type EmbedbinResult<T> = Result<T, EmbedbinError>;

/// Step of a file write that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    /// Creating the temporary or fallback file
    Create,
    /// Writing payload bytes
    Write,
    /// Flushing to stable storage
    Sync,
    /// Applying the permission mode
    SetPermissions,
    /// Renaming the temp file over the target, or keeping the fallback file
    Persist,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::Create => "create",
            Self::Write => "write",
            Self::Sync => "sync",
            Self::SetPermissions => "set permissions",
            Self::Persist => "persist",
        };
        write!(f, "{}", stage)
    }
}

/// Failure while working on one path inside the cache directory
#[derive(Error, Debug)]
pub enum CacheFileError {
    #[error("Failed to create cache directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path} ({stage}): {source}")]
    Write {
        path: PathBuf,
        stage: WriteStage,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create fallback file in {dir} ({stage}): {source}")]
    FallbackCreate {
        dir: PathBuf,
        stage: WriteStage,
        #[source]
        source: std::io::Error,
    },
}

impl CacheFileError {
    /// Create a write error for the canonical path
    pub fn write(path: impl Into<PathBuf>, stage: WriteStage, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            stage,
            source,
        }
    }

    /// Create a write error for the fallback path
    pub fn fallback(dir: impl Into<PathBuf>, stage: WriteStage, source: std::io::Error) -> Self {
        Self::FallbackCreate {
            dir: dir.into(),
            stage,
            source,
        }
    }

    /// The underlying IO error
    pub fn io_error(&self) -> &std::io::Error {
        match self {
            Self::DirectoryCreate { source, .. }
            | Self::Stat { source, .. }
            | Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::FallbackCreate { source, .. } => source,
        }
    }
}

/// All errors that can occur in embedbin
#[derive(Error, Debug)]
pub enum EmbedbinError {
    // Materialization errors
    #[error("Invalid binary name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error(transparent)]
    CacheFile(#[from] CacheFileError),

    #[error("Failed to materialize {name}: {canonical}; fallback also failed: {fallback}")]
    Materialize {
        name: String,
        #[source]
        canonical: CacheFileError,
        fallback: CacheFileError,
    },

    // Launcher errors
    #[error("Failed to create file {name}: {source}")]
    Resolve {
        name: String,
        #[source]
        source: Box<EmbedbinError>,
    },

    #[error("Execution of {name} was cancelled")]
    Cancelled { name: String },

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl EmbedbinError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Both causes of a failed materialization, canonical first
    pub fn causes(&self) -> Option<(&CacheFileError, &CacheFileError)> {
        match self {
            Self::Materialize {
                canonical,
                fallback,
                ..
            } => Some((canonical, fallback)),
            Self::Resolve { source, .. } => source.causes(),
            _ => None,
        }
    }

    /// Check if calling again may succeed once the filesystem issue clears
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::CacheFile(_) | Self::Materialize { .. } => true,
            Self::Resolve { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheFile(CacheFileError::DirectoryCreate { .. }) | Self::Materialize { .. } => {
                Some("Point --cache-root (or EMBEDBIN_CACHE_ROOT) at a writable directory")
            }
            Self::Resolve { source, .. } => source.hint(),
            Self::ConfigInvalid { .. } => Some("Run: embedbin config init --force"),
            _ => None,
        }
    }
}
