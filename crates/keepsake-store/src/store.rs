//! Version store implementation.

use crate::{FileAccess, StoreError, StoreResult, Version, VersionFile, VersionId};
use keepsake_storage::Storage;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Storage namespace for version records.
const VERSIONS_KEY: &str = "versions";

/// A store of named version snapshots.
///
/// The store owns the persisted version collection; resource content at the
/// tracked paths belongs to the hosting application and is only touched
/// through the injected [`FileAccess`] collaborator.
///
/// Construct with [`VersionStore::new`], then call
/// [`initialize`](VersionStore::initialize) once at startup; every other
/// operation fails with [`StoreError::Unavailable`] until that has succeeded.
pub struct VersionStore<S, F> {
    storage: S,
    files: F,
    ready: bool,
}

impl<S: Storage, F: FileAccess> VersionStore<S, F> {
    /// Create a store over the given persistence backend and file access.
    pub fn new(storage: S, files: F) -> Self {
        Self {
            storage,
            files,
            ready: false,
        }
    }

    /// Open the persistence medium, establishing the version collection if
    /// absent, and mark the store ready. Idempotent.
    pub async fn initialize(&mut self) -> StoreResult<()> {
        self.storage
            .open()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
        self.ready = true;
        Ok(())
    }

    fn ensure_ready(&self) -> StoreResult<()> {
        if self.ready {
            Ok(())
        } else {
            Err(StoreError::unavailable("store is not initialized"))
        }
    }

    /// Capture the current content of every path in `manifest` as a new
    /// version named `name`.
    ///
    /// Paths that cannot be read are logged and omitted; an unreadable
    /// resource never fails the save. Duplicate manifest paths are captured
    /// once (first occurrence wins).
    pub async fn save_version(&self, name: &str, manifest: &[&str]) -> StoreResult<Version> {
        self.ensure_ready()?;

        if name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }

        let mut files = Vec::new();
        let mut seen = HashSet::new();
        for &path in manifest {
            if !seen.insert(path) {
                continue;
            }
            match self.files.read(path).await {
                Ok(content) => files.push(VersionFile {
                    path: path.to_string(),
                    content,
                }),
                Err(e) => warn!(path, error = %e, "Skipping unreadable resource"),
            }
        }

        let version = Version::new(name, files);
        self.storage
            .write(&[VERSIONS_KEY, version.id.as_str()], &version)
            .await?;

        info!(
            id = %version.id,
            name = %version.name,
            files = version.files.len(),
            "Saved version"
        );

        Ok(version)
    }

    /// List all stored versions, newest first.
    pub async fn list_versions(&self) -> StoreResult<Vec<Version>> {
        self.ensure_ready()?;

        let mut versions = Vec::new();
        for id in self.storage.list(&[VERSIONS_KEY]).await? {
            match self.storage.read::<Version>(&[VERSIONS_KEY, &id]).await? {
                Some(version) => versions.push(version),
                None => debug!(id = %id, "Version disappeared between list and read"),
            }
        }

        versions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(versions)
    }

    /// Look up a version by id. Unknown ids are `None`, not an error.
    pub async fn get_version(&self, id: &VersionId) -> StoreResult<Option<Version>> {
        self.ensure_ready()?;
        Ok(self.storage.read(&[VERSIONS_KEY, id.as_str()]).await?)
    }

    /// Write a version's captured content back to the tracked resources.
    ///
    /// The current content of every path in `manifest` is saved as a backup
    /// version first, unconditionally; the backup is returned. If any
    /// individual write fails the call stops with
    /// [`StoreError::Restore`] naming the failing path — writes already
    /// applied are not rolled back, and the backup version is the recovery
    /// mechanism.
    pub async fn restore_version(
        &self,
        version: &Version,
        manifest: &[&str],
    ) -> StoreResult<Version> {
        self.ensure_ready()?;

        let backup = self
            .save_version(&format!("Backup before restoring {}", version.name), manifest)
            .await?;

        for file in &version.files {
            self.files
                .write(&file.path, &file.content)
                .await
                .map_err(|e| StoreError::restore(&file.path, e))?;
            debug!(path = %file.path, "Restored resource");
        }

        info!(
            id = %version.id,
            name = %version.name,
            files = version.files.len(),
            backup = %backup.id,
            "Restored version"
        );

        Ok(backup)
    }

    /// Delete a version by id. Deleting an absent id is not an error.
    pub async fn delete_version(&self, id: &VersionId) -> StoreResult<()> {
        self.ensure_ready()?;
        self.storage.remove(&[VERSIONS_KEY, id.as_str()]).await?;
        info!(%id, "Deleted version");
        Ok(())
    }

    /// Serialize the full version list (newest first) as portable JSON.
    pub async fn export_all(&self) -> StoreResult<String> {
        let versions = self.list_versions().await?;
        let json = serde_json::to_string_pretty(&versions)
            .map_err(keepsake_storage::StorageError::from)?;
        Ok(json)
    }

    /// Serialize a single version as portable JSON.
    pub fn export_version(&self, version: &Version) -> StoreResult<String> {
        self.ensure_ready()?;
        let json = serde_json::to_string_pretty(version)
            .map_err(keepsake_storage::StorageError::from)?;
        Ok(json)
    }

    /// Import versions from a JSON array previously produced by
    /// [`export_all`](VersionStore::export_all).
    ///
    /// Each record is upserted keyed by id: overwrite-if-present,
    /// insert-if-absent. An empty array is a valid no-op. Not transactional:
    /// if persistence fails partway, earlier upserts remain committed.
    pub async fn import_all(&self, data: &str) -> StoreResult<()> {
        self.ensure_ready()?;

        let versions: Vec<Version> =
            serde_json::from_str(data).map_err(StoreError::ImportFormat)?;

        let count = versions.len();
        for version in &versions {
            self.storage
                .write(&[VERSIONS_KEY, version.id.as_str()], version)
                .await?;
        }

        info!(count, "Imported versions");

        Ok(())
    }
}
