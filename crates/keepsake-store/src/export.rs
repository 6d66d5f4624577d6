//! Export filename conventions.

use chrono::{DateTime, Utc};

/// Conventional filename for a single exported version:
/// lowercased name with whitespace runs replaced by `_`, followed by the
/// version's UTC date, e.g. `my_version_2024-01-15.json`.
pub fn export_file_name(name: &str, timestamp_ms: i64) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('_');
            }
            in_whitespace = true;
        } else {
            slug.push(ch);
            in_whitespace = false;
        }
    }

    let date = DateTime::<Utc>::from_timestamp_millis(timestamp_ms).unwrap_or_default();

    format!("{}_{}.json", slug, date.format("%Y-%m-%d"))
}
