//! Wire types for the content catalog's version list.
//!
//! Every collection defaults to empty when the catalog omits it or sends `null`,
//! so a record with no loader tags is still a valid record; it simply never
//! matches a loader filter.

use super::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One published version of a catalog project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Opaque, catalog-unique identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Human version label. Not guaranteed to be SemVer or unique.
    #[serde(rename = "version_number", default, deserialize_with = "null_as_default")]
    pub label: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub loaders: Vec<String>,

    /// Target runtime (game) versions, e.g. "1.20.1".
    #[serde(default, deserialize_with = "null_as_default")]
    pub game_versions: Vec<String>,

    #[serde(
        rename = "date_published",
        default,
        deserialize_with = "lenient_timestamp"
    )]
    pub published: Option<DateTime<Utc>>,

    /// "release", "beta" or "alpha"; empty when absent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub version_type: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<FileDescriptor>,
}

impl VersionRecord {
    /// The designated main download: the first file flagged primary, else the
    /// first file.
    pub fn primary_file(&self) -> Option<&FileDescriptor> {
        self.files
            .iter()
            .find(|f| f.primary)
            .or_else(|| self.files.first())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileDescriptor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub primary: bool,

    /// Informational only; never used for integrity.
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub hashes: FileHashes,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileHashes {
    #[serde(default)]
    pub sha1: Option<String>,
}

/// Unparsable or missing timestamps become `None`, which orders before any
/// real publish date.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| log::debug!("Ignoring unparsable publish date '{}': {}", s, e))
            .ok()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collections_default_to_empty() {
        let record: VersionRecord =
            serde_json::from_str(r#"{"id":"abc","version_number":"1.0","loaders":null}"#)
                .unwrap();
        assert_eq!(record.id, "abc");
        assert!(record.loaders.is_empty());
        assert!(record.game_versions.is_empty());
        assert!(record.files.is_empty());
        assert!(record.published.is_none());
    }

    #[test]
    fn parses_catalog_shape() {
        let json = r#"{
            "id": "v1",
            "version_number": "2.1.0+fabric",
            "loaders": ["fabric"],
            "game_versions": ["1.20.1"],
            "date_published": "2024-03-01T12:00:00.000000Z",
            "version_type": "release",
            "files": [
                {"url": "https://cdn/a.zip", "filename": "a.zip", "primary": false, "size": 10},
                {"url": "https://cdn/b.mrpack", "filename": "b.mrpack", "primary": true, "size": 20,
                 "hashes": {"sha1": "abc", "sha512": "def"}}
            ]
        }"#;
        let record: VersionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.label, "2.1.0+fabric");
        assert!(record.published.is_some());
        let primary = record.primary_file().unwrap();
        assert_eq!(primary.filename, "b.mrpack");
        assert_eq!(primary.hashes.sha1.as_deref(), Some("abc"));
    }

    #[test]
    fn first_file_is_primary_when_none_flagged() {
        let record: VersionRecord = serde_json::from_str(
            r#"{"id":"x","files":[{"url":"u1","filename":"one.zip"},{"url":"u2","filename":"two.zip"}]}"#,
        )
        .unwrap();
        assert_eq!(record.primary_file().unwrap().filename, "one.zip");
    }

    #[test]
    fn bad_timestamp_is_none() {
        let record: VersionRecord =
            serde_json::from_str(r#"{"id":"x","date_published":"yesterday"}"#).unwrap();
        assert!(record.published.is_none());
    }
}
