//! JSON file-based storage.
//!
//! Each key maps to one file under the base directory:
//! `["versions", "1f3a"]` -> `<base>/versions/1f3a.json`.

use crate::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// JSON file-based storage rooted at a base directory.
#[derive(Clone)]
pub struct JsonStorage {
    base_path: PathBuf,
}

impl JsonStorage {
    /// Create a storage handle at the given base directory.
    ///
    /// The directory is not touched until [`Storage::open`] is called.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn key_to_path(&self, key: &[&str]) -> StorageResult<PathBuf> {
        crate::validate_key(key)?;

        // Append ".json" to the final segment rather than set_extension,
        // which would truncate a segment containing a dot ("v1.2" must map
        // to "v1.2.json", not "v1.json").
        let mut path = self.base_path.clone();
        if let Some((last, parents)) = key.split_last() {
            for component in parents {
                path.push(component);
            }
            path.push(format!("{last}.json"));
        }

        Ok(path)
    }

    fn prefix_to_dir(&self, prefix: &[&str]) -> PathBuf {
        let mut path = self.base_path.clone();
        for component in prefix {
            path.push(component);
        }
        path
    }
}

#[async_trait]
impl Storage for JsonStorage {
    async fn open(&self) -> StorageResult<()> {
        debug!(path = %self.base_path.display(), "Opening storage");
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    async fn read<T: DeserializeOwned + Send>(&self, key: &[&str]) -> StorageResult<Option<T>> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "Reading from storage");

        match fs::read_to_string(&path).await {
            Ok(content) => {
                let value: T = serde_json::from_str(&content)?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn write<T: Serialize + Send + Sync>(
        &self,
        key: &[&str],
        value: &T,
    ) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "Writing to storage");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(value)?;

        // Write to a temp file, then rename, so a failed write never leaves
        // a partial record at the key.
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    async fn remove(&self, key: &[&str]) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "Removing from storage");

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn list(&self, prefix: &[&str]) -> StorageResult<Vec<String>> {
        let dir = self.prefix_to_dir(prefix);
        debug!(path = %dir.display(), "Listing storage");

        let mut names = Vec::new();

        match fs::read_dir(&dir).await {
            Ok(mut entries) => {
                while let Some(entry) = entries.next_entry().await? {
                    let file_name = entry.file_name();
                    // Strip only the literal ".json" suffix so key segments
                    // containing dots round-trip unchanged.
                    if let Some(name) = file_name
                        .to_str()
                        .and_then(|n| n.strip_suffix(".json"))
                    {
                        if !name.is_empty() {
                            names.push(name.to_string());
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // No directory yet means nothing stored under this prefix.
            }
            Err(e) => return Err(StorageError::Io(e)),
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[tokio::test]
    async fn open_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path().join("data"));
        storage.open().await.unwrap();
        storage.open().await.unwrap();
        assert!(dir.path().join("data").is_dir());
    }

    #[tokio::test]
    async fn write_and_read() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        storage.open().await.unwrap();

        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        storage.write(&["versions", "one"], &data).await.unwrap();

        let read: Option<TestData> = storage.read(&["versions", "one"]).await.unwrap();
        assert_eq!(read, Some(data));
    }

    #[tokio::test]
    async fn read_absent_key_is_none() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        storage.open().await.unwrap();

        let read: Option<TestData> = storage.read(&["nonexistent"]).await.unwrap();
        assert_eq!(read, None);
    }

    #[tokio::test]
    async fn write_replaces_existing_value() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        storage.open().await.unwrap();

        let first = TestData {
            name: "first".to_string(),
            value: 1,
        };
        let second = TestData {
            name: "second".to_string(),
            value: 2,
        };

        storage.write(&["key"], &first).await.unwrap();
        storage.write(&["key"], &second).await.unwrap();

        let read: Option<TestData> = storage.read(&["key"]).await.unwrap();
        assert_eq!(read.unwrap().name, "second");
    }

    #[tokio::test]
    async fn remove_absent_key_is_ok() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        storage.open().await.unwrap();

        storage.remove(&["never", "written"]).await.unwrap();
    }

    #[tokio::test]
    async fn remove_deletes_value() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        storage.open().await.unwrap();

        let data = TestData::default();
        storage.write(&["versions", "one"], &data).await.unwrap();
        storage.remove(&["versions", "one"]).await.unwrap();

        let read: Option<TestData> = storage.read(&["versions", "one"]).await.unwrap();
        assert_eq!(read, None);
    }

    #[tokio::test]
    async fn list_returns_child_names() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        storage.open().await.unwrap();

        let data = TestData::default();
        storage.write(&["versions", "a"], &data).await.unwrap();
        storage.write(&["versions", "b"], &data).await.unwrap();
        storage.write(&["versions", "c"], &data).await.unwrap();

        let mut names = storage.list(&["versions"]).await.unwrap();
        names.sort();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn list_absent_prefix_is_empty() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        storage.open().await.unwrap();

        let names = storage.list(&["versions"]).await.unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn invalid_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        storage.open().await.unwrap();

        let data = TestData::default();

        // Empty key
        assert!(storage.write(&[], &data).await.is_err());

        // Path traversal attempt
        assert!(storage.write(&["..", "etc", "passwd"], &data).await.is_err());

        // Slash in component
        assert!(storage.write(&["path/traversal"], &data).await.is_err());
    }

    #[tokio::test]
    async fn dotted_key_components_map_to_distinct_files() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        storage.open().await.unwrap();

        let a = TestData {
            name: "a".to_string(),
            value: 1,
        };
        let b = TestData {
            name: "b".to_string(),
            value: 2,
        };

        storage.write(&["versions", "v1.2"], &a).await.unwrap();
        storage.write(&["versions", "v1.3"], &b).await.unwrap();

        let read_a: Option<TestData> = storage.read(&["versions", "v1.2"]).await.unwrap();
        let read_b: Option<TestData> = storage.read(&["versions", "v1.3"]).await.unwrap();
        assert_eq!(read_a, Some(a));
        assert_eq!(read_b, Some(b));

        let mut names = storage.list(&["versions"]).await.unwrap();
        names.sort();
        assert_eq!(names, vec!["v1.2", "v1.3"]);
    }

    #[tokio::test]
    async fn no_temp_file_remains_after_write() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        storage.open().await.unwrap();

        let data = TestData::default();
        storage.write(&["versions", "a"], &data).await.unwrap();

        let names = storage.list(&["versions"]).await.unwrap();
        assert_eq!(names, vec!["a"]);
        assert!(!dir.path().join("versions/a.json.tmp").exists());
    }
}
