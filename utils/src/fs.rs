//! Directory listing and small file helpers.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::{DirEntry, WalkBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::atomic_write::atomic_write;

#[derive(Debug, Error)]
pub enum ReadJsonError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Every file and directory below `root`, recursively, as absolute paths.
///
/// Hidden entries are included and ignore files are not consulted. `root`
/// itself is not part of the result. Entries that cannot be read are skipped.
pub fn all_contents(root: impl AsRef<Path>) -> Vec<PathBuf> {
    let root = absolute(root.as_ref());
    let walker = walker(&root).build();

    walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(root = %root.display(), "Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.depth() > 0)
        .map(DirEntry::into_path)
        .collect()
}

/// Immediate children of `dir`, sorted by path.
///
/// With `skip_hidden`, entries whose name starts with `.` are left out.
pub fn list_dir(dir: impl AsRef<Path>, skip_hidden: bool) -> io::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if skip_hidden && entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ReadJsonError> {
    let path = path.as_ref();
    let result = fs::read(path)
        .map_err(|source| ReadJsonError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|bytes| {
            serde_json::from_slice(&bytes).map_err(|source| ReadJsonError::Parse {
                path: path.to_path_buf(),
                source,
            })
        });

    if let Err(e) = &result {
        warn!("{e}");
    }
    result
}

/// Write `text` to `path` as UTF-8, atomically.
pub fn save_string(path: impl AsRef<Path>, text: &str) -> io::Result<()> {
    let path = path.as_ref();
    atomic_write(path, text.as_bytes()).inspect_err(|e| {
        warn!(path = %path.display(), "Failed to save file: {e}");
    })
}

fn walker(root: &Path) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .follow_links(false);
    builder
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
