use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kitbag_utils::{atomic_write, recover_bak_file};
use thiserror::Error;
use toml::{Table, Value};
use tracing::debug;

use crate::config_dir;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("failed to write preferences at {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// String and integer settings persisted as a flat TOML table.
///
/// Every mutation is written through to disk atomically.
#[derive(Debug)]
pub struct Preferences {
    path: PathBuf,
    values: Table,
}

impl Preferences {
    /// `~/.kitbag/preferences.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("preferences.toml"))
    }

    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();
        recover_bak_file(&path);

        let values = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|source| PreferencesError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Table::new(),
            Err(source) => return Err(PreferencesError::Read { path, source }),
        };

        Ok(Self { path, values })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn int(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_integer)
    }

    /// Store `value`, or remove `key` when `value` is `None` or empty.
    ///
    /// On error the store is left as it was.
    pub fn set_or_delete_string(
        &mut self,
        key: &str,
        value: Option<&str>,
    ) -> Result<(), PreferencesError> {
        let mut values = self.values.clone();
        match value.filter(|v| !v.is_empty()) {
            Some(v) => values.insert(key.to_owned(), Value::String(v.to_owned())),
            None => values.remove(key),
        };
        self.commit(values)
    }

    /// Store `value`, or remove `key` when `value` is `None`.
    ///
    /// On error the store is left as it was.
    pub fn set_or_delete_int(
        &mut self,
        key: &str,
        value: Option<i64>,
    ) -> Result<(), PreferencesError> {
        let mut values = self.values.clone();
        match value {
            Some(v) => values.insert(key.to_owned(), Value::Integer(v)),
            None => values.remove(key),
        };
        self.commit(values)
    }

    /// Forget every key and delete the backing file.
    pub fn reset(&mut self) -> Result<(), PreferencesError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(PreferencesError::Write {
                    path: self.path.clone(),
                    source,
                });
            }
        }
        self.values.clear();
        Ok(())
    }

    fn commit(&mut self, values: Table) -> Result<(), PreferencesError> {
        self.persist(&values)?;
        self.values = values;
        Ok(())
    }

    fn persist(&self, values: &Table) -> Result<(), PreferencesError> {
        let write_error = |source| PreferencesError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let content = toml::to_string(values)?;
        debug!(path = %self.path.display(), keys = values.len(), "Saving preferences");
        atomic_write(&self.path, content.as_bytes()).map_err(write_error)
    }
}
