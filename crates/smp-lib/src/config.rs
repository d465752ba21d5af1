//! Centralized launcher settings.
//! Static defaults live in constants; `LauncherConfig` carries them at runtime so
//! the CLI and tests can point any endpoint somewhere else.

use crate::error::{LauncherError, LauncherResult};
use reqwest::Client;
use std::time::Duration;

// URL Constants
pub const CATALOG_API_BASE: &str = "https://api.modrinth.com/v2";
pub const RUNTIME_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";
pub const ASSET_OBJECTS_BASE: &str = "https://resources.download.minecraft.net";

/// Catalog project holding the server's content pack.
pub const DEFAULT_PROJECT_ID: &str = "EDFggNY3";

// Server target
pub const SERVER_HOST: &str = "supersmp.fun";
pub const SERVER_PORT: u16 = 25565;

/// The catalog rejects anonymous clients, so every request identifies itself.
pub const USER_AGENT: &str = concat!("SuperSMPLauncher/", env!("CARGO_PKG_VERSION"));

pub const REQUEST_TIMEOUT_SECS: u64 = 120;
pub const PROBE_TIMEOUT_SECS: u64 = 3;

/// Log a progress checkpoint every this many items in bulk loops.
pub const PROGRESS_CHECKPOINT_INTERVAL: usize = 100;

pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DOWNLOAD_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub catalog_base: String,
    pub project_id: String,
    pub runtime_manifest_url: String,
    pub asset_objects_base: String,
    pub server_host: String,
    pub server_port: u16,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub checkpoint_interval: usize,
    /// Number of concurrent library/asset downloads. 1 keeps the loop sequential.
    pub concurrency: usize,
    pub retries: u32,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            catalog_base: CATALOG_API_BASE.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            runtime_manifest_url: RUNTIME_MANIFEST_URL.to_string(),
            asset_objects_base: ASSET_OBJECTS_BASE.to_string(),
            server_host: SERVER_HOST.to_string(),
            server_port: SERVER_PORT,
            user_agent: USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
            checkpoint_interval: PROGRESS_CHECKPOINT_INTERVAL,
            concurrency: DEFAULT_CONCURRENCY,
            retries: DOWNLOAD_RETRIES,
        }
    }
}

impl LauncherConfig {
    /// Config whose catalog, manifest and asset endpoints all live under `base`.
    /// Used against local mirrors and mock servers.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            catalog_base: base.to_string(),
            runtime_manifest_url: format!("{}/mc/game/version_manifest_v2.json", base),
            asset_objects_base: format!("{}/objects", base),
            ..Self::default()
        }
    }
}

/// Build the shared HTTP client. Every component receives a clone of this
/// client; there is no process-wide instance.
pub fn build_http_client(config: &LauncherConfig) -> LauncherResult<Client> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(config.concurrency.max(1))
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| LauncherError::CatalogUnavailable {
            url: config.catalog_base.clone(),
            reason: format!("failed to build HTTP client: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_rewrites_every_endpoint() {
        let config = LauncherConfig::with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.catalog_base, "http://127.0.0.1:9000");
        assert_eq!(
            config.runtime_manifest_url,
            "http://127.0.0.1:9000/mc/game/version_manifest_v2.json"
        );
        assert_eq!(config.asset_objects_base, "http://127.0.0.1:9000/objects");
        assert_eq!(config.server_port, SERVER_PORT);
    }

    #[test]
    fn user_agent_identifies_launcher() {
        assert!(USER_AGENT.starts_with("SuperSMPLauncher/"));
    }
}
