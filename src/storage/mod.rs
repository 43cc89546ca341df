//! Local key/value storage and the account persistence adapter.

mod memory;
mod persistence;
mod sqlite;

pub use memory::MemoryStore;
pub use persistence::{AccountRecord, DEFAULT_NAMESPACE, Persistence};
pub use sqlite::{SqliteStore, SqliteStoreConfig};

use async_trait::async_trait;

/// KeyValueStore is a per-user local store, the equivalent of browser local storage.
///
/// Values are opaque strings keyed by namespace.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Close releases the underlying resources.
    async fn close(&self) -> Result<(), StorageError>;
}

/// StorageError represents errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
