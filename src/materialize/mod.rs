//! Materialization of embedded binaries onto disk
//!
//! Writes payload bytes to a content-addressed path inside the cache
//! directory and reuses that file on later calls.
//!
//! # Layout
//!
//! ```text
//! <cache-root>/embedbin/<name>-<sha256><EXE_SUFFIX>           canonical
//! <cache-root>/embedbin/<name>-<sha256>-<random><EXE_SUFFIX>  fallback
//! ```
//!
//! # Concurrency
//!
//! There is no locking. The canonical path is a pure function of the
//! contents, so concurrent writers always produce identical bytes, and every
//! write goes through a temp file plus atomic rename. A writer that loses the
//! race overwrites a correct file with the same contents.
//!
//! Fallback files are never reclaimed. `list` reports them.

pub mod key;
mod write;

pub use key::{ContentDigest, EntryKind, EntryName, EXE_SUFFIX};

use crate::config::schema::CacheConfig;
use crate::error::{CacheFileError, EmbedbinError, EmbedbinResult, WriteStage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the directory created under the cache root
pub const CACHE_SUBDIR: &str = "embedbin";

/// Default permission mode for materialized binaries
pub const DEFAULT_MODE: u32 = 0o755;

/// One materialization request
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    /// Logical name, used as the file name prefix
    pub name: &'a str,
    /// Executable contents
    pub bytes: &'a [u8],
    /// Permission bits for the file (and for newly created directories)
    pub mode: u32,
}

impl<'a> Payload<'a> {
    /// Create a payload with the default mode
    pub fn new(name: &'a str, bytes: &'a [u8]) -> Self {
        Self {
            name,
            bytes,
            mode: DEFAULT_MODE,
        }
    }

    /// Override the permission mode
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }
}

/// What a materialization call had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No file existed; it was written
    Created,
    /// A file existed with other contents; it was replaced
    Rewritten,
    /// Contents matched; only the permission bits were corrected
    ModeRepaired,
    /// Contents and mode were already correct
    Unchanged,
    /// The canonical path was unusable; a fallback file was written
    Fallback,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Rewritten => "rewritten",
            Self::ModeRepaired => "mode repaired",
            Self::Unchanged => "unchanged",
            Self::Fallback => "fallback",
        };
        write!(f, "{}", s)
    }
}

/// Result of a successful materialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// Path of the runnable file
    pub path: PathBuf,
    /// What was done to produce it
    pub outcome: Outcome,
}

/// Something that can put a payload on disk
///
/// Implemented by [`Materializer`]; the launcher is generic over it.
pub trait Materialize: Send + Sync {
    /// Ensure a file with the payload's exact contents and mode exists
    fn ensure_file(&self, payload: &Payload<'_>) -> EmbedbinResult<Materialized>;
}

/// A binary found in the cache directory
#[derive(Debug, Clone, Serialize)]
pub struct CachedBinary {
    /// Logical name
    pub name: String,
    /// Hex SHA-256 of the contents the file was written from
    pub digest: String,
    /// Canonical or fallback
    pub kind: EntryKind,
    /// Full path
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Last modification time, if the platform reports one
    pub modified: Option<DateTime<Utc>>,
}

/// Filesystem-backed materializer rooted at a cache directory
#[derive(Debug, Clone)]
pub struct Materializer {
    cache_dir: PathBuf,
}

impl Materializer {
    /// Create a materializer that keeps binaries under `<cache_root>/embedbin`
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_root.into().join(CACHE_SUBDIR),
        }
    }

    /// Create a materializer from the cache configuration
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.cache_root())
    }

    /// Directory holding the cached binaries
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Canonical path for `name` and `bytes`, without touching disk
    pub fn canonical_path(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let digest = ContentDigest::of(bytes);
        self.cache_dir.join(key::canonical_file_name(name, &digest))
    }

    /// Ensure a file with `payload`'s contents and mode exists
    ///
    /// Tries the canonical path first. If anything goes wrong there, writes a
    /// uniquely named fallback file instead. Fails only when both fail, with
    /// an error carrying both causes.
    pub fn ensure_file(&self, payload: &Payload<'_>) -> EmbedbinResult<Materialized> {
        key::validate_name(payload.name)?;
        write::create_cache_dir(&self.cache_dir, payload.mode)?;

        let digest = ContentDigest::of(payload.bytes);
        let canonical = self
            .cache_dir
            .join(key::canonical_file_name(payload.name, &digest));
        debug!("Canonical path for {}: {}", payload.name, canonical.display());

        let canonical_err = match reconcile(&canonical, payload.bytes, payload.mode) {
            Ok(outcome) => {
                match outcome {
                    Outcome::Unchanged => debug!("Reusing {}", canonical.display()),
                    _ => info!("Materialized {} ({})", canonical.display(), outcome),
                }
                return Ok(Materialized {
                    path: canonical,
                    outcome,
                });
            }
            Err(e) => e,
        };

        warn!(
            "Cannot use {}: {}; writing fallback copy",
            canonical.display(),
            canonical_err
        );

        let stem = key::entry_stem(payload.name, &digest);
        match write::write_fallback(&self.cache_dir, &stem, payload.bytes, payload.mode) {
            Ok(path) => {
                info!("Materialized fallback {}", path.display());
                Ok(Materialized {
                    path,
                    outcome: Outcome::Fallback,
                })
            }
            Err(fallback_err) => Err(EmbedbinError::Materialize {
                name: payload.name.to_string(),
                canonical: canonical_err,
                fallback: fallback_err,
            }),
        }
    }

    /// List the binaries currently in the cache directory
    pub fn list(&self) -> EmbedbinResult<Vec<CachedBinary>> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(EmbedbinError::io(
                    format!("reading cache directory {}", self.cache_dir.display()),
                    e,
                ))
            }
        };

        let mut binaries = vec![];
        for entry in entries {
            let entry = entry.map_err(|e| EmbedbinError::io("reading cache entry", e))?;
            let file_name = entry.file_name();
            let Some(parsed) = file_name.to_str().and_then(EntryName::parse) else {
                continue;
            };

            // Entries can vanish between read_dir and stat
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            binaries.push(CachedBinary {
                name: parsed.name,
                digest: parsed.digest.to_hex(),
                kind: parsed.kind,
                path: entry.path(),
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        binaries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
        debug!("Found {} cached binaries", binaries.len());
        Ok(binaries)
    }
}

impl Default for Materializer {
    /// Cache under the platform temp directory
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl Materialize for Materializer {
    fn ensure_file(&self, payload: &Payload<'_>) -> EmbedbinResult<Materialized> {
        Materializer::ensure_file(self, payload)
    }
}

/// Bring the file at `path` in line with `bytes` and `mode`
fn reconcile(path: &Path, bytes: &[u8], mode: u32) -> Result<Outcome, CacheFileError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            write::atomic_write(path, bytes, mode)?;
            return Ok(Outcome::Created);
        }
        Err(source) => {
            return Err(CacheFileError::Stat {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    // Size check first so unrelated large files are never read
    if metadata.len() != bytes.len() as u64 {
        debug!("Size mismatch at {}, rewriting", path.display());
        write::atomic_write(path, bytes, mode)?;
        return Ok(Outcome::Rewritten);
    }

    let existing = fs::read(path).map_err(|source| CacheFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if existing != bytes {
        warn!("Contents of {} differ from payload, rewriting", path.display());
        write::atomic_write(path, bytes, mode)?;
        return Ok(Outcome::Rewritten);
    }

    if !write::mode_matches(&metadata, mode) {
        debug!("Repairing mode of {}", path.display());
        write::set_mode(path, mode)
            .map_err(|e| CacheFileError::write(path, WriteStage::SetPermissions, e))?;
        return Ok(Outcome::ModeRepaired);
    }

    Ok(Outcome::Unchanged)
}
