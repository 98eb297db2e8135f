//! Store Factory
//!
//! Builds a validated backend from a [`StoreConfig`].

use tracing::info;

use crate::config::{BackendKind, StoreConfig};
use crate::error::{Result, StoreError};
use crate::store::{FsBackend, MemoryBackend, StorageBackend, Store};

/// Creates a store for `config`.
///
/// The returned backend already validates keys.
///
/// # Errors
/// - `Misconfiguration` if `fs` is selected without a `root_dir`
/// - `Io` if the `fs` root cannot be created
pub fn create_store(config: &StoreConfig) -> Result<Box<dyn StorageBackend>> {
    match config.backend {
        BackendKind::Memory => {
            let default_ttl = config.default_ttl_duration();
            info!(backend = %config.backend, ?default_ttl, "Creating store");
            Ok(Box::new(Store::new(MemoryBackend::new(default_ttl))))
        }
        BackendKind::Fs => {
            let root_dir = config.root_dir.as_ref().ok_or_else(|| {
                StoreError::Misconfiguration("root_dir is required for backend='fs'".to_string())
            })?;
            info!(backend = %config.backend, root_dir = %root_dir.display(), "Creating store");
            Ok(Box::new(Store::new(FsBackend::open(root_dir)?)))
        }
    }
}
