//! Validating Store
//!
//! Wraps any backend and checks key syntax before forwarding each call, so no
//! backend ever sees a malformed key.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::store::{validate_key, validate_prefix, FsBackend, Keys, MemoryBackend, StorageBackend};

// == Store ==
/// A backend behind the key validation gate.
#[derive(Debug)]
pub struct Store<B> {
    backend: B,
}

impl<B: StorageBackend> Store<B> {
    /// Wraps `backend` so that every operation validates its key first.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the wrapped backend for inspection.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl Store<MemoryBackend> {
    /// Validated in-memory store with the given default TTL.
    pub fn memory(default_ttl: Option<Duration>) -> Self {
        Self::new(MemoryBackend::new(default_ttl))
    }
}

impl Store<FsBackend> {
    /// Validated file-system store rooted at `root_dir`.
    pub fn fs(root_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(FsBackend::open(root_dir)?))
    }
}

fn checked(key: &str) -> Result<()> {
    validate_key(key).inspect_err(|e| debug!(error = %e, "Rejected key"))
}

impl<B: StorageBackend> StorageBackend for Store<B> {
    fn get(&mut self, key: &str) -> Result<Vec<u8>> {
        checked(key)?;
        self.backend.get(key)
    }

    fn set(&mut self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        checked(key)?;
        self.backend.set(key, value, ttl)
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        checked(key)?;
        self.backend.delete(key)
    }

    fn list(&mut self, prefix: &str) -> Result<Keys<'_>> {
        validate_prefix(prefix).inspect_err(|e| debug!(error = %e, "Rejected prefix"))?;
        self.backend.list(prefix)
    }

    fn close(&mut self) -> Result<()> {
        self.backend.close()
    }
}
