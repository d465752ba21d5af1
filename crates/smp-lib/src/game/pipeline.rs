//! Resolve, download, install and launch, wired to one injected HTTP client.
//!
//! Each step is a separate call so a front end can show progress between
//! them, re-prompt after a failed match, or stop after any stage.

use crate::api::CatalogClient;
use crate::config::{build_http_client, LauncherConfig};
use crate::error::LauncherResult;
use crate::game::installer::{
    extract_async, install_pack_contents, ArtifactFetcher, DataLayout, InstallReport,
    ProgressReporter, RuntimeArtifactInstaller,
};
use crate::game::launcher::{
    probe_server, LaunchInvocation, LaunchInvocationBuilder, LoaderKind, ServerTarget,
};
use crate::game::matcher::{
    available_game_versions, ContentVariant, MatchCriteria, VariantRule, VersionMatcher,
};
use crate::models::VersionRecord;
use crate::utils::paths::safe_file_name;
use reqwest::Client;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the game directory the pack is installed into.
pub const INSTANCE_NAME: &str = "SuperSMP";

/// What the user picked in the front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackSelection {
    pub loader: String,
    pub game_version: Option<String>,
    pub variant: Option<ContentVariant>,
}

impl PackSelection {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            game_version: None,
            variant: None,
        }
    }

    pub fn with_game_version(mut self, game_version: Option<String>) -> Self {
        self.game_version = game_version;
        self
    }

    pub fn with_variant(mut self, variant: Option<ContentVariant>) -> Self {
        self.variant = variant;
        self
    }

    pub fn criteria(&self) -> MatchCriteria {
        MatchCriteria::new(self.loader.clone())
            .with_game_version(self.game_version.as_deref())
            .with_variant(self.variant.map(VariantRule::shaders))
    }
}

/// Result of fetching and unpacking a content pack.
#[derive(Debug, Clone, Serialize)]
pub struct PackInstall {
    pub record: VersionRecord,
    pub archive: PathBuf,
    pub extracted_files: usize,
    pub copied_files: usize,
    /// Runtime version the pack should run on.
    pub runtime_version: Option<String>,
}

pub struct LauncherPipeline {
    config: LauncherConfig,
    layout: DataLayout,
    catalog: CatalogClient,
    matcher: VersionMatcher,
    fetcher: ArtifactFetcher,
    client: Client,
}

impl LauncherPipeline {
    pub fn new(config: LauncherConfig, data_dir: impl Into<PathBuf>) -> LauncherResult<Self> {
        let client = build_http_client(&config)?;
        Ok(Self::with_client(client, config, data_dir))
    }

    pub fn with_client(client: Client, config: LauncherConfig, data_dir: impl Into<PathBuf>) -> Self {
        let catalog = CatalogClient::from_config(client.clone(), &config);
        let fetcher = ArtifactFetcher::new(client.clone()).with_attempts(config.retries);
        Self {
            layout: DataLayout::new(data_dir),
            matcher: VersionMatcher::default(),
            catalog,
            fetcher,
            client,
            config,
        }
    }

    pub fn with_matcher(mut self, matcher: VersionMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn game_dir(&self) -> PathBuf {
        self.layout.data_dir().join("instances").join(INSTANCE_NAME)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.layout.data_dir().join("downloads")
    }

    pub async fn fetch_versions(&self) -> LauncherResult<Vec<VersionRecord>> {
        self.catalog.fetch_versions(&self.config.project_id).await
    }

    pub async fn available_game_versions(&self) -> LauncherResult<Vec<String>> {
        let records = self.fetch_versions().await?;
        Ok(available_game_versions(&records))
    }

    /// Pick the pack version for `selection`. A failed match comes back as
    /// `LauncherError::NoMatch` with diagnostics attached.
    pub async fn resolve(&self, selection: &PackSelection) -> LauncherResult<VersionRecord> {
        let records = self.fetch_versions().await?;
        let criteria = selection.criteria();
        let record = self.matcher.select_latest(&records, &criteria)?;
        log::info!(
            "Selected {} ({}) for {}",
            record.label,
            record.id,
            criteria
        );
        Ok(record.clone())
    }

    /// Download the record's primary file, unpack it and copy its content
    /// folders into the game directory.
    pub async fn install_pack(
        &self,
        record: &VersionRecord,
        selection: &PackSelection,
        reporter: &dyn ProgressReporter,
    ) -> LauncherResult<PackInstall> {
        reporter.start_step("Downloading content pack", Some(3));
        let archive = self
            .fetcher
            .download_primary_file_with_progress(record, &self.downloads_dir(), reporter)
            .await?;

        reporter.start_step("Extracting content pack", Some(3));
        let staging = self
            .layout
            .data_dir()
            .join("packs")
            .join(safe_file_name(&record.id)?);
        let extracted_files = extract_async(archive.clone(), staging.clone()).await?;

        reporter.start_step("Installing pack contents", Some(3));
        let copied_files = install_pack_contents(staging, self.game_dir()).await?;

        Ok(PackInstall {
            runtime_version: runtime_version_for(record, selection),
            record: record.clone(),
            archive,
            extracted_files,
            copied_files,
        })
    }

    pub async fn install_runtime(
        &self,
        version_id: &str,
        reporter: Arc<dyn ProgressReporter>,
    ) -> LauncherResult<InstallReport> {
        RuntimeArtifactInstaller::new(self.client.clone(), self.config.clone(), self.layout.clone())
            .install(version_id, reporter)
            .await
    }

    /// Resolve, install the pack and install its runtime in one go.
    pub async fn prepare(
        &self,
        selection: &PackSelection,
        reporter: Arc<dyn ProgressReporter>,
    ) -> LauncherResult<(PackInstall, Option<InstallReport>)> {
        let record = self.resolve(selection).await?;
        let pack = self.install_pack(&record, selection, &*reporter).await?;
        let report = match pack.runtime_version.as_deref() {
            Some(version) => Some(self.install_runtime(version, reporter).await?),
            None => {
                log::warn!("{} declares no game version; skipping runtime install", record.id);
                None
            }
        };
        Ok((pack, report))
    }

    pub fn launch_invocation(
        &self,
        runtime_path: &Path,
        installed_version_id: &str,
        loader: LoaderKind,
    ) -> LauncherResult<LaunchInvocation> {
        LaunchInvocationBuilder::new(runtime_path)
            .with_server(Some(self.server_target()))
            .build(
                installed_version_id,
                self.layout.data_dir(),
                &self.game_dir(),
                loader,
            )
    }

    pub fn server_target(&self) -> ServerTarget {
        ServerTarget::new(self.config.server_host.clone(), self.config.server_port)
    }

    pub async fn probe_server(&self) -> bool {
        probe_server(
            &self.config.server_host,
            self.config.server_port,
            self.config.probe_timeout,
        )
        .await
    }
}

impl std::fmt::Debug for LauncherPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LauncherPipeline")
            .field("data_dir", &self.layout.data_dir())
            .field("catalog", &self.catalog.base_url())
            .field("project", &self.config.project_id)
            .finish()
    }
}

/// The requested game version when the record targets it exactly, otherwise
/// the newest version the record targets.
pub fn runtime_version_for(record: &VersionRecord, selection: &PackSelection) -> Option<String> {
    if let Some(wanted) = selection.game_version.as_deref().map(str::trim) {
        if record.game_versions.iter().any(|v| v.trim() == wanted) {
            return Some(wanted.to_string());
        }
    }
    available_game_versions(std::slice::from_ref(record))
        .into_iter()
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(game_versions: &[&str]) -> VersionRecord {
        serde_json::from_value(serde_json::json!({
            "id": "v1",
            "version_number": "1.0.0",
            "game_versions": game_versions,
        }))
        .unwrap()
    }

    #[test]
    fn runtime_version_prefers_exact_selection() {
        let rec = record(&["1.20.1", "1.20.4"]);
        let selection = PackSelection::new("fabric").with_game_version(Some("1.20.1".into()));
        assert_eq!(runtime_version_for(&rec, &selection).as_deref(), Some("1.20.1"));
    }

    #[test]
    fn runtime_version_falls_back_to_newest_target() {
        let rec = record(&["1.20.1", "1.20.4"]);
        let selection = PackSelection::new("fabric").with_game_version(Some("1.20".into()));
        assert_eq!(runtime_version_for(&rec, &selection).as_deref(), Some("1.20.4"));
        assert!(runtime_version_for(&record(&[]), &selection).is_none());
    }

    #[test]
    fn selection_builds_criteria() {
        let criteria = PackSelection::new("fabric")
            .with_game_version(Some("  ".into()))
            .with_variant(Some(ContentVariant::Shaders))
            .criteria();
        assert!(criteria.game_version.is_none());
        assert_eq!(
            criteria.variant.map(|v| v.wanted()),
            Some(ContentVariant::Shaders)
        );
    }

    #[test]
    fn game_dir_lives_under_data_dir() {
        let pipeline = LauncherPipeline::with_client(
            Client::new(),
            LauncherConfig::default(),
            "/data",
        );
        assert_eq!(pipeline.game_dir(), PathBuf::from("/data/instances/SuperSMP"));
        assert_eq!(pipeline.server_target().to_string(), "supersmp.fun:25565");
    }
}
