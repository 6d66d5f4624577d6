//! Key-value persistence layer for keepsake.
//!
//! Version records are stored through a small key-value abstraction so the
//! version store never touches the medium directly. Two backends are provided:
//! - JSON files on disk, one file per key (the default)
//! - In-memory storage (for tests and short-lived embedding)

pub mod error;
pub mod json;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use json::JsonStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Validate key segments, shared by all backends so they agree on which
/// keys are addressable. Segments must not be empty or escape the medium.
pub(crate) fn validate_key(key: &[&str]) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_key("key cannot be empty"));
    }
    for component in key {
        if component.is_empty()
            || component.contains('/')
            || component.contains('\\')
            || *component == "."
            || *component == ".."
        {
            return Err(StorageError::invalid_key(format!(
                "invalid key component: {component}"
            )));
        }
    }
    Ok(())
}

/// A key-value storage backend.
///
/// Keys are path segments, e.g. `["versions", "1f3a..."]`. Values are
/// serialized as JSON.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Open the storage medium, establishing it if absent.
    ///
    /// Idempotent. Every other operation assumes a prior successful `open`.
    async fn open(&self) -> StorageResult<()>;

    /// Read the value at a key.
    ///
    /// Returns `None` if the key doesn't exist.
    async fn read<T: DeserializeOwned + Send>(&self, key: &[&str]) -> StorageResult<Option<T>>;

    /// Write a value at a key, replacing any existing value.
    ///
    /// A failed write must not leave a partial value visible at the key.
    async fn write<T: Serialize + Send + Sync>(&self, key: &[&str], value: &T)
        -> StorageResult<()>;

    /// Remove the value at a key. Removing an absent key is not an error.
    async fn remove(&self, key: &[&str]) -> StorageResult<()>;

    /// List the names of the direct children under a prefix.
    async fn list(&self, prefix: &[&str]) -> StorageResult<Vec<String>>;
}
