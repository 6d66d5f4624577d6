//! Named version snapshots of text resources.
//!
//! This crate keeps immutable, timestamped, named versions of a set of text
//! resources in a local store and can:
//! - Capture the current content of a caller-supplied manifest of paths
//! - Restore a stored version's content back into place, after taking a
//!   safety backup of the current state
//! - Serialize the whole history as portable JSON for backup or exchange
//!
//! Every version is a complete copy of the captured content. There is no
//! diffing, no branching, and no multi-user coordination: one process, one
//! logical actor, linear history.
//!
//! # Example
//!
//! ```no_run
//! use keepsake_storage::JsonStorage;
//! use keepsake_store::{LocalFiles, VersionStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = JsonStorage::new(".keepsake/data");
//! let files = LocalFiles::new("/project/root");
//! let mut store = VersionStore::new(storage, files);
//! store.initialize().await?;
//!
//! let manifest = ["src/main.rs", "Cargo.toml"];
//! let version = store.save_version("before refactor", &manifest).await?;
//!
//! // ... edit the files ...
//!
//! // Restore; the current state is backed up first.
//! store.restore_version(&version, &manifest).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod export;
mod files;
mod store;
mod version;

pub use error::{StoreError, StoreResult};
pub use export::export_file_name;
pub use files::{FileAccess, LocalFiles, MemoryFiles};
pub use store::VersionStore;
pub use version::{Version, VersionFile, VersionId};
