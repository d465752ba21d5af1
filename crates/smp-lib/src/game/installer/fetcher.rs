use crate::error::{LauncherError, LauncherResult};
use crate::game::installer::core::downloader::download_to_path;
use crate::game::installer::types::{ProgressReporter, SilentProgressReporter};
use crate::models::VersionRecord;
use crate::utils::paths::safe_file_name;
use reqwest::Client;
use std::path::{Path, PathBuf};

/// Downloads the primary file of a matched catalog record.
#[derive(Clone)]
pub struct ArtifactFetcher {
    client: Client,
    attempts: u32,
}

impl ArtifactFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            attempts: crate::config::DOWNLOAD_RETRIES,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub async fn download_primary_file(
        &self,
        record: &VersionRecord,
        dest_dir: &Path,
    ) -> LauncherResult<PathBuf> {
        self.download_primary_file_with_progress(record, dest_dir, &SilentProgressReporter)
            .await
    }

    /// Download into `dest_dir/<filename>`, replacing any file of that name.
    /// The catalog's SHA-1 is checked when the record carries one.
    pub async fn download_primary_file_with_progress(
        &self,
        record: &VersionRecord,
        dest_dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> LauncherResult<PathBuf> {
        let file = record.primary_file().ok_or_else(|| LauncherError::NoFiles {
            version_id: record.id.clone(),
            label: record.label.clone(),
        })?;

        let file_name = safe_file_name(&file.filename)?;
        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| LauncherError::io(dest_dir, e))?;

        let dest = dest_dir.join(file_name);
        log::info!(
            "Downloading {} ({}) -> {:?}",
            record.label,
            file.url,
            dest
        );
        reporter.set_message(&format!("Downloading {}", file_name));

        download_to_path(
            &self.client,
            &file.url,
            &dest,
            file.hashes.sha1.as_deref(),
            self.attempts,
            reporter,
        )
        .await?;

        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(files: serde_json::Value) -> VersionRecord {
        serde_json::from_value(serde_json::json!({
            "id": "v1",
            "version_number": "1.0.0",
            "files": files,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn downloads_the_primary_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pack.mrpack"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let rec = record(serde_json::json!([
            {"url": format!("{}/other.zip", server.uri()), "filename": "other.zip"},
            {"url": format!("{}/pack.mrpack", server.uri()), "filename": "pack.mrpack", "primary": true},
        ]));

        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("downloads");
        let local = ArtifactFetcher::new(Client::new())
            .download_primary_file(&rec, &out)
            .await
            .unwrap();

        assert_eq!(local, out.join("pack.mrpack"));
        assert_eq!(std::fs::read(&local).unwrap(), b"PK");
    }

    #[tokio::test]
    async fn record_without_files_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ArtifactFetcher::new(Client::new())
            .download_primary_file(&record(serde_json::json!([])), tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::NoFiles { .. }));
    }

    #[tokio::test]
    async fn traversal_filename_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let rec = record(serde_json::json!([
            {"url": "http://127.0.0.1:1/x", "filename": "../escape.zip", "primary": true}
        ]));
        let err = ArtifactFetcher::new(Client::new())
            .download_primary_file(&rec, tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn http_error_is_a_download_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.zip"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let rec = record(serde_json::json!([
            {"url": format!("{}/gone.zip", server.uri()), "filename": "gone.zip"}
        ]));
        let err = ArtifactFetcher::new(Client::new())
            .download_primary_file(&rec, tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::Download { .. }));
    }
}
