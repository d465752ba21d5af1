use crate::game::matcher::NoMatchError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error taxonomy shared by every component of the library.
///
/// Resolution-stage errors (`CatalogUnavailable`, `CatalogFormat`, `NoMatch`)
/// always reach the caller. `Download` is fatal for single-file fetches and
/// tallied for the best-effort library/asset loops.
#[derive(Debug, Error)]
pub enum LauncherError {
    // Catalog
    #[error("Catalog unavailable at {url}: {reason}")]
    CatalogUnavailable { url: String, reason: String },

    #[error("Catalog returned malformed data from {url}: {source}")]
    CatalogFormat {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    // Matching
    #[error("{0}")]
    NoMatch(Box<NoMatchError>),

    // Acquisition
    #[error("Version {id} not found in manifest ({available} entries scanned)")]
    VersionNotFound { id: String, available: usize },

    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Version {version_id} ({label}) has no downloadable files")]
    NoFiles { version_id: String, label: String },

    // Filesystem
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rejected unsafe path: {0}")]
    InvalidPath(String),

    #[error("Failed to read archive {path:?}: {reason}")]
    Archive { path: PathBuf, reason: String },
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn download(url: &str, reason: impl std::fmt::Display) -> Self {
        LauncherError::Download {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for errors the caller can recover from by re-prompting with
    /// different selection criteria.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LauncherError::NoMatch(_))
    }

    /// Diagnostics attached to a failed match, if this is one.
    pub fn no_match(&self) -> Option<&NoMatchError> {
        match self {
            LauncherError::NoMatch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoMatchError> for LauncherError {
    fn from(err: NoMatchError) -> Self {
        LauncherError::NoMatch(Box::new(err))
    }
}
