//! Atomic file writes.
//!
//! Content goes to a temp file in the destination directory which is then
//! renamed over the target, so readers see either the old or the new file and
//! never a torn write. Where rename-over-existing fails (Windows), the old file
//! is moved to `<name>.bak` first and restored if the second rename fails.

use std::fs::{self, File, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Permission policy for the written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistMode {
    /// Inherit the process umask.
    #[default]
    Default,
    /// Owner read/write only (0o600 on Unix).
    OwnerOnly,
    /// An explicit Unix mode. Ignored elsewhere.
    Mode(u32),
}

impl PersistMode {
    #[cfg(unix)]
    fn unix_mode(self) -> Option<u32> {
        match self {
            Self::Default => None,
            Self::OwnerOnly => Some(0o600),
            Self::Mode(mode) => Some(mode),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSyncPolicy {
    SyncAll,
    SkipSync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentDirSyncPolicy {
    SyncBestEffort,
    SkipSync,
}

#[derive(Debug, Clone, Copy)]
pub struct AtomicWriteOptions {
    /// Whether to fsync the temp file before renaming it into place.
    pub file_sync: FileSyncPolicy,
    /// Whether to fsync the parent directory after the rename.
    pub parent_dir_sync: ParentDirSyncPolicy,
    pub mode: PersistMode,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self {
        Self {
            file_sync: FileSyncPolicy::SyncAll,
            parent_dir_sync: ParentDirSyncPolicy::SkipSync,
            mode: PersistMode::Default,
        }
    }
}

/// `<file name>.bak` next to `path`, e.g. `prefs.toml.bak`.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Restore `path` from its backup left behind by an interrupted write.
///
/// Only acts when `path` is missing and the backup exists.
pub fn recover_bak_file(path: &Path) {
    let backup = backup_path(path);
    if path.exists() || !backup.exists() {
        return;
    }
    match fs::rename(&backup, path) {
        Ok(()) => warn!(path = %path.display(), "Recovered .bak file from interrupted write"),
        Err(e) => warn!(path = %path.display(), "Failed to recover .bak file: {e}"),
    }
}

pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    atomic_write_with_options(path, bytes, AtomicWriteOptions::default())
}

pub fn atomic_write_with_options(
    path: impl AsRef<Path>,
    bytes: &[u8],
    options: AtomicWriteOptions,
) -> io::Result<()> {
    let path = path.as_ref();
    let parent = parent_dir(path);

    let mut tmp = NamedTempFile::new_in(parent)?;
    apply_mode(tmp.path(), options.mode)?;

    tmp.write_all(bytes)?;
    if options.file_sync == FileSyncPolicy::SyncAll {
        tmp.as_file().sync_all()?;
    }

    if let Err(err) = tmp.persist(path) {
        if !path.exists() {
            return Err(err.error);
        }

        let backup = backup_path(path);
        let _ = fs::remove_file(&backup);
        fs::rename(path, &backup)?;

        if let Err(retry) = err.file.persist(path) {
            let _ = fs::rename(&backup, path);
            return Err(retry.error);
        }
        if let Err(e) = fs::remove_file(&backup) {
            warn!(path = %backup.display(), "Failed to remove .bak after atomic write: {e}");
        }
    }

    apply_mode(path, options.mode)?;

    if options.parent_dir_sync == ParentDirSyncPolicy::SyncBestEffort {
        sync_dir_best_effort(parent);
    }

    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: PersistMode) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match mode.unix_mode() {
        Some(mode) => fs::set_permissions(path, Permissions::from_mode(mode)),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: PersistMode) -> io::Result<()> {
    Ok(())
}

fn sync_dir_best_effort(dir: &Path) {
    #[cfg(unix)]
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        debug!(path = %dir.display(), "Directory sync_all failed (best-effort): {e}");
    }

    #[cfg(not(unix))]
    debug!(path = %dir.display(), "Directory sync not supported on this platform");
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{
        AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy, PersistMode, atomic_write,
        atomic_write_with_options, backup_path, recover_bak_file,
    };

    fn fast_options(mode: PersistMode) -> AtomicWriteOptions {
        AtomicWriteOptions {
            file_sync: FileSyncPolicy::SkipSync,
            parent_dir_sync: ParentDirSyncPolicy::SyncBestEffort,
            mode,
        }
    }

    #[test]
    fn overwrites_existing_and_cleans_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("note.txt");

        atomic_write(&path, b"one").expect("write one");
        atomic_write_with_options(&path, b"two", fast_options(PersistMode::Default))
            .expect("write two");

        assert_eq!(fs::read_to_string(&path).expect("read"), "two");
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn missing_parent_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("note.txt");
        assert!(atomic_write(&path, b"x").is_err());
    }

    #[test]
    fn recover_restores_backup_only_when_target_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.toml");
        let backup = backup_path(&path);

        fs::write(&backup, "saved").expect("write backup");
        recover_bak_file(&path);
        assert_eq!(fs::read_to_string(&path).expect("read"), "saved");
        assert!(!backup.exists());

        fs::write(&backup, "stale").expect("write backup");
        recover_bak_file(&path);
        assert_eq!(fs::read_to_string(&path).expect("read"), "saved");
        assert!(backup.exists());
    }

    #[test]
    fn backups_are_per_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let toml = dir.path().join("prefs.toml");
        let json = dir.path().join("prefs.json");
        assert_eq!(backup_path(&toml), dir.path().join("prefs.toml.bak"));
        assert_ne!(backup_path(&toml), backup_path(&json));

        fs::write(backup_path(&toml), "toml backup").expect("write backup");
        recover_bak_file(&json);
        assert!(!json.exists());

        recover_bak_file(&toml);
        assert_eq!(fs::read_to_string(&toml).expect("read"), "toml backup");
    }

    #[cfg(unix)]
    #[test]
    fn owner_only_mode_is_applied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("secret.txt");

        atomic_write_with_options(&path, b"secret", fast_options(PersistMode::OwnerOnly))
            .expect("write");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
