//! kvstore demo
//!
//! Builds a store from `KVSTORE_*` environment variables and runs a short
//! session against it.

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kvstore::{create_store, StorageBackend, StoreConfig};

/// Main entry point for the kvstore demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the configured store
/// 4. Set, get, list and delete a key, then look up a missing one
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvstore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoreConfig::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: backend={}, root_dir={:?}, default_ttl={:?}",
        config.backend, config.root_dir, config.default_ttl
    );

    let mut store = create_store(&config).context("Failed to create store")?;

    store.set("users/alice", b"hello", None)?;
    let value = store.get("users/alice")?;
    println!("users/alice = {}", String::from_utf8_lossy(&value));

    let keys = store
        .list("users/")?
        .collect::<kvstore::Result<Vec<_>>>()?;
    println!("keys under users/: {keys:?}");

    println!("deleted users/alice: {}", store.delete("users/alice")?);

    match store.get("missing") {
        Ok(_) => warn!("Unexpected value for missing key"),
        Err(e) if e.is_not_found() => println!("missing: not found"),
        Err(e) => return Err(e.into()),
    }

    store.close()?;
    info!("Store closed");
    Ok(())
}
