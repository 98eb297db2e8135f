//! Store Module
//!
//! Storage contract, key validation, and the in-memory and file-system backends.

mod backend;
mod entry;
mod factory;
mod fs;
mod key;
mod memory;
mod validated;


// Re-export public types
pub use backend::{Keys, StorageBackend};
pub(crate) use entry::Entry;
pub use factory::create_store;
pub use fs::FsBackend;
pub use key::{validate_key, validate_prefix};
pub use memory::MemoryBackend;
pub use validated::Store;

// == Public Constants ==
/// Maximum allowed key length in characters
pub const MAX_KEY_LENGTH: usize = 256;

/// Extension appended to file names that have none
pub const DEFAULT_EXTENSION: &str = "bin";
