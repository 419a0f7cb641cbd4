//! Configuration for kitbag.
//!
//! Two stores live here:
//!
//! - [`KitbagConfig`]: the optional, hand-edited `~/.kitbag/config.toml`.
//! - [`Preferences`]: a small key/value file the program itself writes.

mod preferences;

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use kitbag_utils::RetryPolicy;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

pub use preferences::{Preferences, PreferencesError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct KitbagConfig {
    pub log: Option<LogConfig>,
    pub retry: Option<RetryConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogConfig {
    /// A `tracing` filter directive such as `debug` or `kitbag_http=trace`.
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RetryConfig {
    /// Total attempts. `0` means retry until success.
    pub max_attempts: Option<u32>,
    pub delay_ms: Option<u64>,
}

impl RetryConfig {
    /// Overlay the configured values on [`RetryPolicy::default`].
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::default();
        if let Some(max) = self.max_attempts {
            policy.max_attempts = NonZeroU32::new(max);
        }
        if let Some(ms) = self.delay_ms {
            policy.delay = Duration::from_millis(ms);
        }
        policy
    }
}

/// Replace `${VAR}` with the value of environment variable `VAR`.
///
/// Unset variables expand to nothing. An unclosed `${` is kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(open) = rest.find("${") {
        let after = &rest[open + 2..];
        let Some(close) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        let var = &after[..close];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

impl KitbagConfig {
    /// Load `~/.kitbag/config.toml`. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(source) => {
                warn!(path = %path.display(), "Failed to read config: {source}");
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(source) => {
                warn!(path = %path.display(), "Failed to parse config: {source}");
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// The configured log filter, with environment variables expanded.
    #[must_use]
    pub fn log_level(&self) -> Option<String> {
        self.log
            .as_ref()
            .and_then(|log| log.level.as_deref())
            .map(expand_env_vars)
            .filter(|level| !level.trim().is_empty())
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::policy)
            .unwrap_or_default()
    }
}

#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kitbag"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
