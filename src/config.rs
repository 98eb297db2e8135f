//! Configuration Module
//!
//! Describes which backend to build and how, loaded from defaults, environment
//! variables, or a JSON file.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

// == Backend Kind ==
/// Backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Volatile in-process map
    #[default]
    Memory,
    /// One file per key under a root directory
    Fs,
}

impl FromStr for BackendKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "fs" => Ok(BackendKind::Fs),
            other => Err(StoreError::Misconfiguration(format!(
                "Unknown backend: {other:?}"
            ))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => f.write_str("memory"),
            BackendKind::Fs => f.write_str("fs"),
        }
    }
}

// == Store Config ==
/// Store configuration parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend to construct
    pub backend: BackendKind,
    /// Root directory, required for the `fs` backend
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
    /// Default TTL in seconds, applied by the `memory` backend only
    #[serde(default)]
    pub default_ttl: Option<u64>,
}

impl StoreConfig {
    /// Configuration for an in-memory store.
    pub fn memory(default_ttl: Option<u64>) -> Self {
        Self {
            backend: BackendKind::Memory,
            root_dir: None,
            default_ttl,
        }
    }

    /// Configuration for a file-system store rooted at `root_dir`.
    pub fn fs(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::Fs,
            root_dir: Some(root_dir.into()),
            default_ttl: None,
        }
    }

    /// Creates a StoreConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `KVSTORE_BACKEND` - `memory` or `fs` (default: memory)
    /// - `KVSTORE_ROOT_DIR` - Root directory for the fs backend (default: unset)
    /// - `KVSTORE_DEFAULT_TTL` - Default TTL in seconds (default: unset, never expire)
    ///
    /// Unlike missing variables, present but unparsable values are reported
    /// as `Misconfiguration`.
    pub fn from_env() -> Result<Self> {
        let backend = match env::var("KVSTORE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => BackendKind::default(),
        };

        let root_dir = env::var_os("KVSTORE_ROOT_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let default_ttl = match env::var("KVSTORE_DEFAULT_TTL") {
            Ok(v) => Some(v.trim().parse::<u64>().map_err(|e| {
                StoreError::Misconfiguration(format!("KVSTORE_DEFAULT_TTL={v:?}: {e}"))
            })?),
            Err(_) => None,
        };

        Ok(Self {
            backend,
            root_dir,
            default_ttl,
        })
    }

    /// Loads a StoreConfig from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            StoreError::Misconfiguration(format!("{}: {e}", path.display()))
        })
    }

    /// Default TTL as a Duration; zero is treated as "never expire".
    pub fn default_ttl_duration(&self) -> Option<Duration> {
        self.default_ttl
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
