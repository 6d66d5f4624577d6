//! Resource read/write collaborators.
//!
//! The version store never touches resources directly. The hosting
//! application supplies a [`FileAccess`] implementation that maps resource
//! paths to whatever actually holds the content.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use tokio::fs;
use tracing::debug;

/// Read and write access to tracked resources, keyed by path.
#[async_trait]
pub trait FileAccess: Send + Sync {
    /// Read the current text content of a resource.
    async fn read(&self, path: &str) -> io::Result<String>;

    /// Overwrite a resource's content.
    async fn write(&self, path: &str, content: &str) -> io::Result<()>;
}

/// Filesystem-backed resources under a root directory.
///
/// Resource paths are interpreted relative to the root; paths that would
/// escape the root are rejected.
pub struct LocalFiles {
    root: PathBuf,
}

impl LocalFiles {
    /// Create a file access rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        // Normalize the root up front so the containment check in resolve
        // compares like with like when the root has `.`/`..` components.
        Self {
            root: normalize(&root.into()),
        }
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let joined = self.root.join(path);
        let normalized = normalize(&joined);
        if normalized.starts_with(&self.root) {
            Ok(normalized)
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path escapes root: {path}"),
            ))
        }
    }
}

#[async_trait]
impl FileAccess for LocalFiles {
    async fn read(&self, path: &str) -> io::Result<String> {
        let resolved = self.resolve(path)?;
        fs::read_to_string(&resolved).await
    }

    async fn write(&self, path: &str, content: &str) -> io::Result<()> {
        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&resolved, content).await?;
        debug!(path, "Wrote resource");
        Ok(())
    }
}

#[async_trait]
impl<T: FileAccess + ?Sized> FileAccess for std::sync::Arc<T> {
    async fn read(&self, path: &str) -> io::Result<String> {
        (**self).read(path).await
    }

    async fn write(&self, path: &str, content: &str) -> io::Result<()> {
        (**self).write(path, content).await
    }
}

/// Remove `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            _ => result.push(component),
        }
    }
    result
}

/// In-memory resources, primarily for tests.
#[derive(Default)]
pub struct MemoryFiles {
    contents: RwLock<HashMap<String, String>>,
}

impl MemoryFiles {
    /// Create an empty in-memory file access.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a resource with content.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        self.contents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), content.into());
    }

    /// Get a resource's current content, if present.
    pub fn get(&self, path: &str) -> Option<String> {
        self.contents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }
}

#[async_trait]
impl FileAccess for MemoryFiles {
    async fn read(&self, path: &str) -> io::Result<String> {
        self.get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such resource: {path}")))
    }

    async fn write(&self, path: &str, content: &str) -> io::Result<()> {
        self.insert(path, content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn local_files_read_write_round_trip() {
        let dir = tempdir().unwrap();
        let files = LocalFiles::new(dir.path());

        files.write("src/app.ts", "content").await.unwrap();
        let read = files.read("src/app.ts").await.unwrap();
        assert_eq!(read, "content");
    }

    #[tokio::test]
    async fn local_files_read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let files = LocalFiles::new(dir.path());

        let err = files.read("missing.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn local_files_reject_escaping_paths() {
        let dir = tempdir().unwrap();
        let files = LocalFiles::new(dir.path());

        let err = files.read("../outside.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err = files.write("../../etc/passwd", "x").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn local_files_accept_unnormalized_root() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        // Root spelled with a `..` component still resolves correctly.
        let files = LocalFiles::new(dir.path().join("sub").join(".."));

        files.write("a.txt", "hello").await.unwrap();
        assert_eq!(files.read("a.txt").await.unwrap(), "hello");
        assert!(dir.path().join("a.txt").exists());

        let err = files.read("../outside.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn memory_files_read_write() {
        let files = MemoryFiles::new();
        files.insert("a.txt", "hello");

        assert_eq!(files.read("a.txt").await.unwrap(), "hello");
        files.write("a.txt", "world").await.unwrap();
        assert_eq!(files.read("a.txt").await.unwrap(), "world");

        let err = files.read("b.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
