//! Runtime installation: manifest, primary binary, libraries, assets.
//!
//! Stages run strictly in that order. Manifest resolution and the primary
//! binary are fatal on failure; libraries and assets are best-effort and come
//! back as tallies in the [`InstallReport`].

use crate::config::LauncherConfig;
use crate::error::{LauncherError, LauncherResult};
use crate::game::installer::core::batch::{BatchArtifact, BatchDownloader, BatchTally, FailedItem};
use crate::game::installer::core::downloader::{
    download_to_path, fetch_catalog_bytes, fetch_json_with_client, sha1_hex, write_atomic,
};
use crate::game::installer::types::{DataLayout, OsType, ProgressReporter};
use crate::models::{AssetIndexDocument, AssetIndexRef, RuntimeManifest, VersionDescriptor};
use crate::utils::paths::{safe_file_name, safe_join, validate_object_hash};
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStage {
    Manifest,
    PrimaryBinary,
    Libraries,
    Assets,
}

impl InstallStage {
    pub const ALL: [InstallStage; 4] = [
        InstallStage::Manifest,
        InstallStage::PrimaryBinary,
        InstallStage::Libraries,
        InstallStage::Assets,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            InstallStage::Manifest => "Resolving version manifest",
            InstallStage::PrimaryBinary => "Downloading game client",
            InstallStage::Libraries => "Downloading libraries",
            InstallStage::Assets => "Downloading assets",
        }
    }

    fn percent(&self) -> i32 {
        match self {
            InstallStage::Manifest => 5,
            InstallStage::PrimaryBinary => 20,
            InstallStage::Libraries => 40,
            InstallStage::Assets => 70,
        }
    }
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOutcome {
    Downloaded,
    /// Reused on existence alone; the content hash is not compared.
    AlreadyPresent,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub version_id: String,
    pub main_class: Option<String>,
    pub binary: BinaryOutcome,
    pub libraries: BatchTally,
    /// Libraries skipped by OS rules or because they declare no artifact.
    pub libraries_excluded: usize,
    pub asset_index: Option<String>,
    /// Set when the asset index itself could not be obtained.
    pub asset_index_error: Option<String>,
    pub assets: BatchTally,
}

impl InstallReport {
    /// True when every best-effort item landed on disk.
    pub fn is_complete(&self) -> bool {
        self.libraries.is_complete() && self.assets.is_complete() && self.asset_index_error.is_none()
    }

    pub fn summary(&self) -> String {
        let binary = match self.binary {
            BinaryOutcome::Downloaded => "downloaded",
            BinaryOutcome::AlreadyPresent => "already present",
        };
        let mut out = format!(
            "{}: client {}; libraries {} new, {} present, {} failed, {} excluded; assets {} new, {} present, {} failed",
            self.version_id,
            binary,
            self.libraries.downloaded,
            self.libraries.skipped,
            self.libraries.failed,
            self.libraries_excluded,
            self.assets.downloaded,
            self.assets.skipped,
            self.assets.failed,
        );
        if let Some(err) = &self.asset_index_error {
            out.push_str(&format!("; asset index unavailable ({})", err));
        }
        out
    }
}

/// Installs one runtime version into a [`DataLayout`].
pub struct RuntimeArtifactInstaller {
    client: Client,
    config: LauncherConfig,
    layout: DataLayout,
    os: OsType,
}

impl RuntimeArtifactInstaller {
    pub fn new(client: Client, config: LauncherConfig, layout: DataLayout) -> Self {
        Self {
            client,
            config,
            layout,
            os: OsType::current(),
        }
    }

    /// Evaluate library rules for another OS.
    pub fn with_os(mut self, os: OsType) -> Self {
        self.os = os;
        self
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub async fn install(
        &self,
        version_id: &str,
        reporter: Arc<dyn ProgressReporter>,
    ) -> LauncherResult<InstallReport> {
        log::info!("Installing runtime {}", version_id);
        let version_id = safe_file_name(version_id)?;
        let total_steps = InstallStage::ALL.len() as u32;

        self.enter(InstallStage::Manifest, &*reporter, total_steps);
        let descriptor = self.resolve_descriptor(version_id).await?;

        self.enter(InstallStage::PrimaryBinary, &*reporter, total_steps);
        let binary = self.install_binary(version_id, &descriptor, &*reporter).await?;

        self.enter(InstallStage::Libraries, &*reporter, total_steps);
        let (libraries, libraries_excluded) =
            self.install_libraries(&descriptor, reporter.clone()).await;

        self.enter(InstallStage::Assets, &*reporter, total_steps);
        let (asset_index_error, assets) = match &descriptor.asset_index {
            Some(index) => match self.load_asset_index(index).await {
                Ok(document) => (None, self.install_assets(&document, reporter.clone()).await),
                Err(e) => {
                    log::warn!("Asset index {} unavailable, skipping assets: {}", index.id, e);
                    (Some(e.to_string()), BatchTally::default())
                }
            },
            None => {
                log::info!("{} declares no asset index", version_id);
                (None, BatchTally::default())
            }
        };

        let report = InstallReport {
            version_id: version_id.to_string(),
            main_class: descriptor.main_class.clone(),
            binary,
            libraries,
            libraries_excluded,
            asset_index: descriptor.asset_index_id().map(str::to_string),
            asset_index_error,
            assets,
        };

        log::info!("Runtime install finished: {}", report.summary());
        reporter.set_percent(100);
        reporter.done(true, Some(&report.summary()));
        Ok(report)
    }

    fn enter(&self, stage: InstallStage, reporter: &dyn ProgressReporter, total_steps: u32) {
        log::info!("[stage] {}", stage);
        reporter.start_step(stage.title(), Some(total_steps));
        reporter.set_percent(stage.percent());
    }

    /// Exact lookup in the manifest, then fetch and persist the descriptor.
    /// A descriptor already on disk that still parses is reused.
    async fn resolve_descriptor(&self, version_id: &str) -> LauncherResult<VersionDescriptor> {
        let manifest: RuntimeManifest =
            fetch_json_with_client(&self.client, &self.config.runtime_manifest_url).await?;

        let entry = manifest
            .find(version_id)
            .ok_or_else(|| LauncherError::VersionNotFound {
                id: version_id.to_string(),
                available: manifest.versions.len(),
            })?;

        let descriptor_path = self.layout.descriptor_path(version_id);
        if let Some(local) = read_json::<VersionDescriptor>(&descriptor_path).await {
            log::info!("Found local version descriptor at {:?}", descriptor_path);
            return Ok(local);
        }

        let bytes = fetch_catalog_bytes(&self.client, &entry.url).await?;
        if let Some(expected) = entry.sha1.as_deref() {
            verify_sha1(&entry.url, &bytes, expected)?;
        }
        let descriptor: VersionDescriptor =
            serde_json::from_slice(&bytes).map_err(|source| LauncherError::CatalogFormat {
                url: entry.url.clone(),
                source,
            })?;
        if descriptor.id != version_id {
            log::warn!(
                "Descriptor for {} names itself {:?}; files are stored under {}",
                version_id,
                descriptor.id,
                version_id
            );
        }
        write_atomic(&descriptor_path, &bytes).await?;
        log::info!(
            "Version descriptor loaded: {} ({} libraries)",
            descriptor.id,
            descriptor.libraries.len()
        );
        Ok(descriptor)
    }

    /// The binary is laid out under the requested id, never the id the remote
    /// descriptor claims for itself.
    async fn install_binary(
        &self,
        version_id: &str,
        descriptor: &VersionDescriptor,
        reporter: &dyn ProgressReporter,
    ) -> LauncherResult<BinaryOutcome> {
        let binary_path = self.layout.binary_path(version_id);
        if tokio::fs::try_exists(&binary_path).await.unwrap_or(false) {
            log::info!("Client binary already present: {:?}", binary_path);
            return Ok(BinaryOutcome::AlreadyPresent);
        }

        let client = descriptor
            .downloads
            .client
            .as_ref()
            .ok_or_else(|| LauncherError::NoFiles {
                version_id: version_id.to_string(),
                label: "client".to_string(),
            })?;

        download_to_path(
            &self.client,
            &client.url,
            &binary_path,
            client.sha1.as_deref(),
            self.config.retries,
            reporter,
        )
        .await?;
        log::info!("Client binary downloaded to {:?}", binary_path);
        Ok(BinaryOutcome::Downloaded)
    }

    async fn install_libraries(
        &self,
        descriptor: &VersionDescriptor,
        reporter: Arc<dyn ProgressReporter>,
    ) -> (BatchTally, usize) {
        let libraries_dir = self.layout.libraries_dir();
        let os_name = self.os.as_str();
        let mut excluded = 0;
        let mut rejected = Vec::new();
        let mut batch = Vec::new();

        for library in &descriptor.libraries {
            if !library.applies_to(os_name) {
                log::debug!("Library {} excluded by OS rules", library.name);
                excluded += 1;
                continue;
            }
            let Some(artifact) = library.artifact() else {
                log::debug!("Library {} has no artifact download", library.name);
                excluded += 1;
                continue;
            };
            match safe_join(&libraries_dir, &artifact.path) {
                Ok(path) => batch.push(BatchArtifact {
                    name: library.name.clone(),
                    url: artifact.url.clone(),
                    path,
                    sha1: artifact.sha1.clone(),
                }),
                Err(e) => {
                    log::warn!("Skipping library {}: {}", library.name, e);
                    rejected.push(FailedItem {
                        name: library.name.clone(),
                        url: artifact.url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Libraries: {} to check, {} excluded",
            batch.len(),
            excluded
        );
        let mut tally = self
            .batch_downloader()
            .download_all(batch, reporter, "Libraries", log::Level::Warn)
            .await;
        tally.failed += rejected.len();
        tally.failures.extend(rejected);
        (tally, excluded)
    }

    /// Local index if it parses, otherwise fetch and persist a fresh one.
    async fn load_asset_index(&self, index: &AssetIndexRef) -> LauncherResult<AssetIndexDocument> {
        let index_path = self.layout.asset_index_path(safe_file_name(&index.id)?);
        if let Some(local) = read_json::<AssetIndexDocument>(&index_path).await {
            log::info!("Asset index already present: {:?}", index_path);
            return Ok(local);
        }

        let bytes = fetch_catalog_bytes(&self.client, &index.url).await?;
        if let Some(expected) = index.sha1.as_deref() {
            verify_sha1(&index.url, &bytes, expected)?;
        }
        let document: AssetIndexDocument =
            serde_json::from_slice(&bytes).map_err(|source| LauncherError::CatalogFormat {
                url: index.url.clone(),
                source,
            })?;
        write_atomic(&index_path, &bytes).await?;
        log::info!(
            "Asset index {} downloaded ({} objects)",
            index.id,
            document.objects.len()
        );
        Ok(document)
    }

    async fn install_assets(
        &self,
        document: &AssetIndexDocument,
        reporter: Arc<dyn ProgressReporter>,
    ) -> BatchTally {
        let base = self.config.asset_objects_base.trim_end_matches('/');
        let mut rejected = Vec::new();
        let mut batch = Vec::with_capacity(document.objects.len());

        for (name, object) in &document.objects {
            if let Err(e) = validate_object_hash(&object.hash) {
                log::debug!("Skipping asset {}: {}", name, e);
                rejected.push(FailedItem {
                    name: name.clone(),
                    url: String::new(),
                    reason: e.to_string(),
                });
                continue;
            }
            let prefix = &object.hash[..2];
            batch.push(BatchArtifact {
                name: name.clone(),
                url: format!("{}/{}/{}", base, prefix, object.hash),
                path: self.layout.asset_object_path(&object.hash),
                sha1: Some(object.hash.clone()),
            });
        }

        // Missing objects only degrade cosmetics; keep them out of the warn log.
        let mut tally = self
            .batch_downloader()
            .download_all(batch, reporter, "Assets", log::Level::Debug)
            .await;
        tally.failed += rejected.len();
        tally.failures.extend(rejected);
        if tally.failed > 0 {
            log::info!("{} asset objects could not be downloaded", tally.failed);
        }
        tally
    }

    fn batch_downloader(&self) -> BatchDownloader {
        BatchDownloader::new(self.client.clone(), self.config.concurrency)
            .with_attempts(self.config.retries)
            .with_checkpoint_interval(self.config.checkpoint_interval)
    }
}

fn verify_sha1(url: &str, bytes: &[u8], expected: &str) -> LauncherResult<()> {
    let computed = sha1_hex(bytes);
    if computed.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(LauncherError::download(
            url,
            format!("SHA1 mismatch: expected {}, got {}", expected, computed),
        ))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = tokio::fs::read(path).await.ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::warn!("Ignoring unreadable local document {:?}: {}", path, e);
            None
        }
    }
}
