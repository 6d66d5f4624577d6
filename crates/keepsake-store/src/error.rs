//! Version store error types.

use keepsake_storage::StorageError;
use thiserror::Error;

/// Result type for version store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during version store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage medium could not be opened, or the store was used
    /// before a successful `initialize`.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the version collection failed.
    #[error("persistence failed: {0}")]
    Persistence(#[from] StorageError),

    /// A resource write failed during restore. Writes already applied for
    /// earlier paths are not rolled back.
    #[error("failed to restore {path}: {source}")]
    Restore {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Import input is not a JSON array of version records.
    #[error("import data is not a list of versions: {0}")]
    ImportFormat(#[source] serde_json::Error),

    /// A version name must be non-empty.
    #[error("version name cannot be empty")]
    EmptyName,
}

impl StoreError {
    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Create a restore error for a failing path.
    pub fn restore(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Restore {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_error_names_the_failing_path() {
        let err = StoreError::restore(
            "src/app.ts",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("src/app.ts"));
    }

    #[test]
    fn import_format_error_wraps_parse_failure() {
        let parse_err = serde_json::from_str::<Vec<i32>>("not a list").unwrap_err();
        let err = StoreError::ImportFormat(parse_err);
        assert!(err.to_string().contains("not a list of versions"));
    }

    #[test]
    fn storage_errors_map_to_persistence() {
        let err = StoreError::from(StorageError::invalid_key("bad"));
        assert!(matches!(err, StoreError::Persistence(_)));
    }
}
