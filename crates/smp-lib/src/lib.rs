//! Core library for the SuperSMP launcher: catalog lookup, version matching,
//! pack and runtime downloads, and launch invocation building.

pub mod api;
pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod utils;

pub use api::CatalogClient;
pub use config::{build_http_client, LauncherConfig};
pub use error::{LauncherError, LauncherResult};
pub use game::installer::{
    ArtifactFetcher, DataLayout, InstallReport, ProgressReporter, RuntimeArtifactInstaller,
    SilentProgressReporter,
};
pub use game::launcher::{LaunchInvocation, LaunchInvocationBuilder, LoaderKind};
pub use game::matcher::{
    available_game_versions, select_latest, ContentVariant, MatchCriteria, NoMatchError,
    VariantRule, VersionMatcher,
};
pub use game::{LauncherPipeline, PackSelection};
pub use models::VersionRecord;
