//! Version data structures.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub String);

impl VersionId {
    /// Create a new random version ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a version ID from a string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One captured resource: its path and full text content at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFile {
    /// Resource path, as supplied by the caller's manifest.
    pub path: String,

    /// Full text content. No diffing, every version is a complete copy.
    pub content: String,
}

/// A named, timestamped snapshot of a set of text resources.
///
/// Versions are immutable once created: they are only ever created, read,
/// or deleted by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Unique identifier for this version.
    pub id: VersionId,

    /// When the version was taken, in milliseconds since the Unix epoch.
    pub timestamp: i64,

    /// User-supplied label. Not required to be unique.
    pub name: String,

    /// Captured resources, at most one entry per distinct path.
    pub files: Vec<VersionFile>,

    /// Optional data-table dump bundled with the snapshot: table name to rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<BTreeMap<String, Vec<serde_json::Value>>>,
}

impl Version {
    /// Create a new version with a fresh id, stamped with the current time.
    pub fn new(name: impl Into<String>, files: Vec<VersionFile>) -> Self {
        Self {
            id: VersionId::new(),
            timestamp: Utc::now().timestamp_millis(),
            name: name.into(),
            files,
            tables: None,
        }
    }

    /// Attach a data-table dump to this version.
    pub fn with_tables(mut self, tables: BTreeMap<String, Vec<serde_json::Value>>) -> Self {
        self.tables = Some(tables);
        self
    }

    /// Check whether this version captured a specific path.
    pub fn contains_path(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}
