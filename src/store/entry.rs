//! Store Entry Module
//!
//! Defines the structure for individual in-memory entries with TTL support.

use std::time::{Duration, Instant};

// == Entry ==
/// A stored value plus its optional expiration instant.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    /// The stored value
    pub value: Vec<u8>,
    /// Monotonic expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl Entry {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` from now.
    ///
    /// A `None` or zero `ttl` means the entry never expires.
    pub fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl
            .filter(|ttl| !ttl.is_zero())
            .and_then(|ttl| Instant::now().checked_add(ttl));

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks expiry against a caller-supplied instant.
    ///
    /// Boundary condition: an entry is expired once `now` reaches its
    /// expiration instant, not only after passing it.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Checks expiry against the current instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}
