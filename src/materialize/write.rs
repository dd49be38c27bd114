//! Low-level writes into the cache directory
//!
//! Canonical entries are written to a hidden temp sibling and renamed over
//! the target, so a reader sees either the old file or the complete new one.
//! Fallback entries get a unique name and are never renamed.

use super::key::EXE_SUFFIX;
use crate::error::{CacheFileError, WriteStage};
use std::fs::{self, Metadata};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Prefix of in-flight temp files; independent of the target name, whose
/// length alone may already be close to the file name limit
const TEMP_PREFIX: &str = ".embedbin-";

/// Permission bits that take part in comparisons
#[cfg(unix)]
const MODE_MASK: u32 = 0o7777;

/// Create `dir` and any missing parents, requesting `mode` for new directories
pub(crate) fn create_cache_dir(dir: &Path, mode: u32) -> Result<(), CacheFileError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder
        .create(dir)
        .map_err(|source| CacheFileError::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })
}

/// Check whether the file's permission bits already equal `mode`
pub(crate) fn mode_matches(metadata: &Metadata, mode: u32) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & MODE_MASK == mode & MODE_MASK
    }
    #[cfg(not(unix))]
    {
        // Only the read-only flag exists here; executables must be writable
        // by the owner for a later rewrite to succeed.
        let _ = mode;
        !metadata.permissions().readonly()
    }
}

/// Apply `mode` to an existing path
pub(crate) fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }
    #[cfg(not(unix))]
    {
        let _ = mode;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_readonly(false);
        fs::set_permissions(path, perms)
    }
}

/// Write `bytes` to `target` through a temp sibling and an atomic rename
pub(crate) fn atomic_write(target: &Path, bytes: &[u8], mode: u32) -> Result<(), CacheFileError> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));

    let temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| CacheFileError::write(target, WriteStage::Create, e))?;

    fill(&temp, bytes).map_err(|(stage, e)| CacheFileError::write(target, stage, e))?;
    set_mode(temp.path(), mode)
        .map_err(|e| CacheFileError::write(target, WriteStage::SetPermissions, e))?;

    // Dropping the returned handle closes the file before anyone execs it
    temp.persist(target)
        .map_err(|e| CacheFileError::write(target, WriteStage::Persist, e.error))?;
    Ok(())
}

/// Write `bytes` to a new uniquely named file `<stem>-<random><EXE_SUFFIX>` in `dir`
pub(crate) fn write_fallback(
    dir: &Path,
    stem: &str,
    bytes: &[u8],
    mode: u32,
) -> Result<PathBuf, CacheFileError> {
    let temp = tempfile::Builder::new()
        .prefix(&format!("{}-", stem))
        .suffix(EXE_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| CacheFileError::fallback(dir, WriteStage::Create, e))?;

    fill(&temp, bytes).map_err(|(stage, e)| CacheFileError::fallback(dir, stage, e))?;
    set_mode(temp.path(), mode)
        .map_err(|e| CacheFileError::fallback(dir, WriteStage::SetPermissions, e))?;

    let (_file, path) = temp
        .keep()
        .map_err(|e| CacheFileError::fallback(dir, WriteStage::Persist, e.error))?;
    Ok(path)
}

/// Write all bytes and flush them to stable storage
fn fill(temp: &NamedTempFile, bytes: &[u8]) -> Result<(), (WriteStage, std::io::Error)> {
    let mut file = temp.as_file();
    file.write_all(bytes).map_err(|e| (WriteStage::Write, e))?;
    file.sync_all().map_err(|e| (WriteStage::Sync, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("tool");

        atomic_write(&target, b"payload", 0o755).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"payload");
        assert!(mode_matches(&fs::metadata(&target).unwrap(), 0o755));
    }

    #[test]
    fn atomic_write_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("tool");
        fs::write(&target, b"old contents that are longer").unwrap();

        atomic_write(&target, b"new", 0o700).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn atomic_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        atomic_write(&dir.path().join("tool"), b"payload", 0o755).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("tool")]);
    }

    #[test]
    fn atomic_write_onto_directory_fails_at_persist() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();

        let err = atomic_write(&target, b"payload", 0o755).unwrap_err();
        assert!(matches!(
            err,
            CacheFileError::Write {
                stage: WriteStage::Persist,
                ..
            }
        ));
    }

    #[test]
    fn atomic_write_accepts_names_near_the_limit() {
        let dir = TempDir::new().unwrap();
        // 250 bytes: a temp name derived from it would not fit in NAME_MAX
        let target = dir.path().join("t".repeat(250));

        atomic_write(&target, b"payload", 0o755).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"payload");
    }

    #[test]
    fn fallback_names_are_unique() {
        let dir = TempDir::new().unwrap();
        let first = write_fallback(dir.path(), "hello-abc", b"x", 0o755).unwrap();
        let second = write_fallback(dir.path(), "hello-abc", b"x", 0o755).unwrap();

        assert_ne!(first, second);
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("hello-abc-"));
        assert!(name.ends_with(EXE_SUFFIX));
        assert_eq!(fs::read(&second).unwrap(), b"x");
    }

    #[test]
    fn create_cache_dir_fails_under_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, b"").unwrap();

        let err = create_cache_dir(&file.join("embedbin"), 0o755).unwrap_err();
        assert!(matches!(err, CacheFileError::DirectoryCreate { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn set_mode_applies_bits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tool");
        fs::write(&path, b"").unwrap();

        set_mode(&path, 0o750).unwrap();

        let metadata = fs::metadata(&path).unwrap();
        assert!(mode_matches(&metadata, 0o750));
        assert!(!mode_matches(&metadata, 0o755));
    }
}
