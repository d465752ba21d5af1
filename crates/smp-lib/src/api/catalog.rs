//! Content catalog client.
//!
//! Lists the published versions of a project. The catalog refuses requests
//! without an identifying user agent, so the header is set on every request
//! even when the injected client already carries a default.

use crate::config::LauncherConfig;
use crate::error::{LauncherError, LauncherResult};
use crate::models::VersionRecord;
use crate::utils::paths::safe_file_name;
use reqwest::header::USER_AGENT;
use reqwest::Client;

#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl CatalogClient {
    pub fn new(client: Client, base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
        }
    }

    pub fn from_config(client: Client, config: &LauncherConfig) -> Self {
        Self::new(client, config.catalog_base.clone(), config.user_agent.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn versions_url(&self, project_id: &str) -> LauncherResult<String> {
        let project_id = safe_file_name(project_id)?;
        Ok(format!("{}/project/{}/version", self.base_url, project_id))
    }

    /// Fetch every version record of `project_id`, in catalog order.
    pub async fn fetch_versions(&self, project_id: &str) -> LauncherResult<Vec<VersionRecord>> {
        let url = self.versions_url(project_id)?;
        log::info!("Fetching catalog versions: {}", url);

        let unavailable = |reason: String| LauncherError::CatalogUnavailable {
            url: url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(unavailable(format!("HTTP {} - {}", status, snippet)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        let records: Vec<VersionRecord> =
            serde_json::from_slice(&bytes).map_err(|source| LauncherError::CatalogFormat {
                url: url.clone(),
                source,
            })?;

        log::info!("Catalog returned {} versions for {}", records.len(), project_id);
        Ok(records)
    }
}
