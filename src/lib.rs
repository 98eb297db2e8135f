//! kvstore - A minimal key-value store
//!
//! Uniform get/set/delete/list/close interface over an in-memory backend with
//! lazy TTL expiration and a file-per-key backend with atomic writes.

pub mod config;
pub mod error;
pub mod store;

pub use config::{BackendKind, StoreConfig};
pub use error::{Result, StoreError};
pub use store::{create_store, FsBackend, MemoryBackend, StorageBackend, Store};
