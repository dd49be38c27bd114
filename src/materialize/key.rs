//! Content-addressed naming of cached binaries
//!
//! A cached binary is named after its logical name and the SHA-256 of its
//! contents. Same bytes = same file name, so a file found under that name
//! can be trusted once its contents have been compared.

use crate::error::{EmbedbinError, EmbedbinResult};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Native executable suffix of the host platform (`.exe` on Windows)
pub const EXE_SUFFIX: &str = std::env::consts::EXE_SUFFIX;

/// Length of a hex-encoded SHA-256 digest
const DIGEST_HEX_LEN: usize = 64;

/// SHA-256 fingerprint of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Hash payload bytes
    pub fn of(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 32];
        raw.copy_from_slice(&Sha256::digest(bytes));
        Self(raw)
    }

    /// Parse a 64 character hex digest
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != DIGEST_HEX_LEN {
            return None;
        }
        let mut raw = [0u8; 32];
        hex::decode_to_slice(hex, &mut raw).ok()?;
        Some(Self(raw))
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Reject names that would escape the cache directory or produce an
/// unusable file name
pub fn validate_name(name: &str) -> EmbedbinResult<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.contains('\0') {
        Some("name contains a NUL byte")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(EmbedbinError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// File stem shared by the canonical and fallback entries: `<name>-<hex>`
pub fn entry_stem(name: &str, digest: &ContentDigest) -> String {
    format!("{}-{}", name, digest)
}

/// Canonical file name: `<name>-<hex><EXE_SUFFIX>`
pub fn canonical_file_name(name: &str, digest: &ContentDigest) -> String {
    format!("{}{}", entry_stem(name, digest), EXE_SUFFIX)
}

/// How an entry in the cache directory was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Deduplicated, content-addressed file
    Canonical,
    /// Uniquely named file written when the canonical path was unusable
    Fallback,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical => write!(f, "canonical"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Logical name, digest and kind recovered from a cache file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryName {
    pub name: String,
    pub digest: ContentDigest,
    pub kind: EntryKind,
}

impl EntryName {
    /// Parse a file name from the cache directory
    ///
    /// Returns `None` for in-flight temp files and anything this crate did
    /// not write.
    pub fn parse(file_name: &str) -> Option<Self> {
        if file_name.starts_with('.') {
            return None;
        }
        let stem = file_name.strip_suffix(EXE_SUFFIX)?;

        let (head, last) = stem.rsplit_once('-')?;
        if let Some(digest) = ContentDigest::from_hex(last) {
            return Self::build(head, digest, EntryKind::Canonical);
        }

        // Fallback: <name>-<hex>-<random>
        if last.is_empty() || !last.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        let (name, hex) = head.rsplit_once('-')?;
        let digest = ContentDigest::from_hex(hex)?;
        Self::build(name, digest, EntryKind::Fallback)
    }

    fn build(name: &str, digest: ContentDigest, kind: EntryKind) -> Option<Self> {
        validate_name(name).ok()?;
        Some(Self {
            name: name.to_string(),
            digest,
            kind,
        })
    }
}
