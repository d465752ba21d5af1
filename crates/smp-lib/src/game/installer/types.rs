use std::path::{Path, PathBuf};

/// Progress reporter trait for installer operations.
/// Purely observational: nothing here influences what gets installed, except
/// that a cancelled reporter stops further transfers.
pub trait ProgressReporter: Send + Sync {
    /// Start a new step with optional total steps
    fn start_step(&self, name: &str, total_steps: Option<u32>);

    /// Update bytes transferred for the current download
    fn update_bytes(&self, transferred: u64, total: Option<u64>);

    /// Set overall percentage (0-100)
    fn set_percent(&self, percent: i32);

    /// Set a short status message
    fn set_message(&self, message: &str);

    /// Set a numeric item count for the current step (e.g. "300/4000").
    fn set_step_count(&self, current: u32, total: Option<u32>);

    /// Mark operation as complete
    fn done(&self, success: bool, message: Option<&str>);

    /// Check if operation has been cancelled
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A progress reporter that does nothing (silent).
/// Useful for background verification or tests.
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start_step(&self, _name: &str, _total_steps: Option<u32>) {}
    fn update_bytes(&self, _transferred: u64, _total: Option<u64>) {}
    fn set_percent(&self, _percent: i32) {}
    fn set_message(&self, _message: &str) {}
    fn set_step_count(&self, _current: u32, _total: Option<u32>) {}
    fn done(&self, _success: bool, _message: Option<&str>) {}
}

/// On-disk layout rooted at the launcher data directory.
///
/// The primary binary keeps a `.jar` name because the runtime only loads
/// classpath entries with an archive extension.
///
/// ```text
/// {data}/versions/{id}/{id}.jar    primary binary
/// {data}/versions/{id}/{id}.json   version descriptor
/// {data}/libraries/...             maven-style library tree
/// {data}/assets/indexes/{idx}.json
/// {data}/assets/objects/{hh}/{hash}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    data_dir: PathBuf,
}

impl DataLayout {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Get the root data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.data_dir.join("libraries")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.data_dir.join("assets")
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.data_dir.join("versions")
    }

    pub fn version_dir(&self, version_id: &str) -> PathBuf {
        self.versions_dir().join(version_id)
    }

    pub fn binary_path(&self, version_id: &str) -> PathBuf {
        self.version_dir(version_id)
            .join(format!("{}.{}", version_id, PRIMARY_BINARY_EXTENSION))
    }

    pub fn descriptor_path(&self, version_id: &str) -> PathBuf {
        self.version_dir(version_id).join(format!("{}.json", version_id))
    }

    pub fn asset_index_path(&self, index_id: &str) -> PathBuf {
        self.assets_dir()
            .join("indexes")
            .join(format!("{}.json", index_id))
    }

    /// Sharded object path: `objects/{hash[0..2]}/{hash}`. Callers validate
    /// the hash first (see `utils::paths::validate_object_hash`).
    pub fn asset_object_path(&self, hash: &str) -> PathBuf {
        self.assets_dir().join("objects").join(&hash[..2]).join(hash)
    }

    /// Natives are shared per version.
    pub fn natives_dir(&self, version_id: &str) -> PathBuf {
        self.data_dir.join("natives").join(version_id)
    }
}

/// The runtime loads its primary binary from the classpath, which requires
/// an archive extension.
pub const PRIMARY_BINARY_EXTENSION: &str = "jar";

/// Operating system types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsType {
    Windows,
    MacOS,
    Linux,
}

impl OsType {
    /// Detect the current OS
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsType::Windows
        } else if cfg!(target_os = "macos") {
            OsType::MacOS
        } else {
            OsType::Linux
        }
    }

    /// Get the OS name as a string (for library rule matching)
    pub fn as_str(&self) -> &'static str {
        match self {
            OsType::Windows => "windows",
            OsType::Linux => "linux",
            OsType::MacOS => "osx",
        }
    }

    /// Get the classpath separator for this OS
    pub fn classpath_separator(&self) -> &'static str {
        match self {
            OsType::Windows => ";",
            _ => ":",
        }
    }
}
