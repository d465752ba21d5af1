pub mod contents;
pub mod core;
pub mod extract;
pub mod fetcher;
pub mod runtime;
pub mod types;

pub use contents::{install_pack_contents, PACK_FOLDERS};
pub use self::core::batch::{BatchArtifact, BatchDownloader, BatchTally, FailedItem};
pub use extract::{extract, extract_async};
pub use fetcher::ArtifactFetcher;
pub use runtime::{BinaryOutcome, InstallReport, InstallStage, RuntimeArtifactInstaller};
pub use types::*;
