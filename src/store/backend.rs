//! Storage Backend Contract
//!
//! The five operations every backend implements.

use std::time::Duration;

use crate::error::Result;

/// Lazy sequence of keys returned by [`StorageBackend::list`].
///
/// Items are fallible so that errors found mid-walk reach the caller.
pub type Keys<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

// == Storage Backend ==
/// Uniform interface over interchangeable storage backends.
///
/// Implementations are not internally synchronized; every operation takes
/// `&mut self` and callers sharing a backend across threads must serialize
/// access themselves. Implementations do not validate key syntax, wrap them in
/// [`Store`](crate::store::Store) for that.
pub trait StorageBackend {
    /// Returns the value for `key`, or `KeyNotFound` if absent or expired.
    fn get(&mut self, key: &str) -> Result<Vec<u8>>;

    /// Inserts or overwrites `key`. A `ttl` of `None` uses the backend default.
    fn set(&mut self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Removes `key`, returning whether a live entry was removed.
    fn delete(&mut self, key: &str) -> Result<bool>;

    /// Returns every live key starting with `prefix`, in no particular order.
    fn list(&mut self, prefix: &str) -> Result<Keys<'_>>;

    /// Releases backend resources. Idempotent.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn get(&mut self, key: &str) -> Result<Vec<u8>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        (**self).set(key, value, ttl)
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn list(&mut self, prefix: &str) -> Result<Keys<'_>> {
        (**self).list(prefix)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
