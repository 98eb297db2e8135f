//! Memory Backend Module
//!
//! Volatile HashMap storage with lazy TTL expiration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::{Entry, Keys, StorageBackend};

// == Memory Backend ==
/// In-process map from key to entry.
///
/// Expired entries are only removed when `get` or `list` observes them;
/// there is no background sweep.
#[derive(Debug)]
pub struct MemoryBackend {
    /// Key-value storage
    entries: HashMap<String, Entry>,
    /// TTL applied when `set` is called without one
    default_ttl: Option<Duration>,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates an empty backend. A `None` or zero default TTL means entries
    /// stored without an explicit TTL never expire.
    pub(crate) fn new(default_ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
        }
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&mut self, key: &str) -> Result<Vec<u8>> {
        let Some(entry) = self.entries.get(key) else {
            return Err(StoreError::KeyNotFound(key.to_string()));
        };

        if entry.is_expired() {
            self.entries.remove(key);
            debug!(key, "Evicted expired entry on get");
            return Err(StoreError::KeyNotFound(key.to_string()));
        }

        Ok(entry.value.clone())
    }

    fn set(&mut self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let effective_ttl = ttl.or(self.default_ttl);
        self.entries
            .insert(key.to_string(), Entry::new(value.to_vec(), effective_ttl));
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn list(&mut self, prefix: &str) -> Result<Keys<'_>> {
        let now = Instant::now();
        let mut matched = Vec::new();
        let mut evicted = 0usize;

        // Evict and collect in a single pass.
        self.entries.retain(|key, entry| {
            if entry.is_expired_at(now) {
                evicted += 1;
                return false;
            }
            if key.starts_with(prefix) {
                matched.push(key.clone());
            }
            true
        });

        if evicted > 0 {
            debug!(evicted, "Evicted expired entries on list");
        }

        Ok(Box::new(matched.into_iter().map(Ok)))
    }
}
