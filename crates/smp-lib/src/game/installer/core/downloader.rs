use crate::error::{LauncherError, LauncherResult};
use crate::game::installer::types::ProgressReporter;
use futures::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs::{create_dir_all, File};
use tokio::io::AsyncWriteExt;

// NOTE: Retry delay is a base value; we apply a simple linear backoff (delay * attempt).
const RETRY_DELAY_MS: u64 = 1000;

/// One failed attempt, and whether another attempt could help.
enum AttemptError {
    Retryable(LauncherError),
    Fatal(LauncherError),
}

impl AttemptError {
    fn into_inner(self) -> LauncherError {
        match self {
            AttemptError::Retryable(e) | AttemptError::Fatal(e) => e,
        }
    }
}

/// Download `url` to `path`, overwriting whatever is there.
///
/// The body streams into `<name>.part` beside the destination and is renamed
/// into place only once complete and (if `expected_sha1` is given) verified,
/// so an interrupted transfer never looks like a finished file. Transport
/// faults and 5xx responses are retried up to `attempts` times; other HTTP
/// errors, checksum mismatches and cancellation fail immediately.
///
/// Returns the number of bytes written.
pub async fn download_to_path(
    client: &Client,
    url: &str,
    path: &Path,
    expected_sha1: Option<&str>,
    attempts: u32,
    reporter: &dyn ProgressReporter,
) -> LauncherResult<u64> {
    log::debug!("Downloading: {} -> {:?}", url, path);

    if url.trim().is_empty() {
        return Err(LauncherError::download(url, "empty download URL"));
    }

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .await
            .map_err(|e| LauncherError::io(parent, e))?;
    }

    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match download_with_validation(client, url, path, expected_sha1, reporter).await {
            Ok(bytes) => {
                log::debug!("Download complete: {:?}", path);
                return Ok(bytes);
            }
            Err(AttemptError::Retryable(e)) if attempt < attempts && !reporter.is_cancelled() => {
                log::warn!(
                    "Download failed (attempt {}/{}) : {}. Retrying...",
                    attempt,
                    attempts,
                    e
                );
                tokio::time::sleep(std::time::Duration::from_millis(
                    RETRY_DELAY_MS * attempt as u64,
                ))
                .await;
            }
            Err(e) => {
                let e = e.into_inner();
                if attempt > 1 {
                    log::error!("Download failed after {} attempts: {}", attempt, e);
                }
                return Err(e);
            }
        }
    }
}

fn part_path(path: &Path) -> PathBuf {
    let tmp_name = format!(
        "{}.part",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("download")
    );
    path.with_file_name(tmp_name)
}

async fn download_with_validation(
    client: &Client,
    url: &str,
    path: &Path,
    expected_sha1: Option<&str>,
    reporter: &dyn ProgressReporter,
) -> Result<u64, AttemptError> {
    let start = Instant::now();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AttemptError::Retryable(LauncherError::download(url, e)))?;

    let status = response.status();
    if !status.is_success() {
        let err = LauncherError::download(url, format!("HTTP {}", status));
        return Err(if status.is_server_error() {
            AttemptError::Retryable(err)
        } else {
            AttemptError::Fatal(err)
        });
    }

    let total_size = response.content_length();
    log::debug!("Download size: {:?} bytes", total_size);

    let tmp_path = part_path(path);
    let result = stream_to_file(response, url, &tmp_path, expected_sha1, total_size, reporter).await;
    let (downloaded, chunk_count) = match result {
        Ok(stats) => stats,
        Err(e) => {
            // Never leave a partial body where a later existence check could see it.
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e);
        }
    };

    // Atomic move into place
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| AttemptError::Fatal(LauncherError::io(path, e)))?;

    let secs = start.elapsed().as_secs_f64();
    let throughput = (downloaded as f64 / 1024.0 / 1024.0) / secs.max(0.001); // MB/s
    log::info!(
        "Download stats: url={}, size={} bytes, chunks={}, time={:.2}s, throughput={:.2} MB/s",
        url,
        downloaded,
        chunk_count,
        secs,
        throughput
    );

    Ok(downloaded)
}

async fn stream_to_file(
    response: reqwest::Response,
    url: &str,
    tmp_path: &Path,
    expected_sha1: Option<&str>,
    total_size: Option<u64>,
    reporter: &dyn ProgressReporter,
) -> Result<(u64, u64), AttemptError> {
    let io_err = |e: std::io::Error| AttemptError::Fatal(LauncherError::io(tmp_path, e));

    let mut file = File::create(tmp_path).await.map_err(io_err)?;
    let mut downloaded: u64 = 0;
    let mut chunk_count: u64 = 0;
    let mut hasher = Sha1::new();

    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        if reporter.is_cancelled() {
            log::warn!("Download cancelled: {:?}", tmp_path);
            return Err(AttemptError::Fatal(LauncherError::download(
                url,
                "cancelled by user",
            )));
        }

        let chunk =
            chunk_result.map_err(|e| AttemptError::Retryable(LauncherError::download(url, e)))?;
        file.write_all(&chunk).await.map_err(io_err)?;
        hasher.update(&chunk);

        downloaded += chunk.len() as u64;
        chunk_count += 1;
        reporter.update_bytes(downloaded, total_size);
    }
    file.flush().await.map_err(io_err)?;
    // Ensure data is flushed to disk
    file.sync_all().await.map_err(io_err)?;
    drop(file);

    if let Some(expected) = expected_sha1 {
        let computed = format!("{:x}", hasher.finalize());
        if !computed.eq_ignore_ascii_case(expected.trim()) {
            return Err(AttemptError::Fatal(LauncherError::download(
                url,
                format!("SHA1 mismatch: expected {}, got {}", expected, computed),
            )));
        }
        log::debug!("SHA1 validated: {}", computed);
    }

    Ok((downloaded, chunk_count))
}

/// Fetch a JSON document from a catalog endpoint.
///
/// Transport faults and non-2xx statuses map to `CatalogUnavailable`; a body
/// that does not deserialize maps to `CatalogFormat`.
pub async fn fetch_json_with_client<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
) -> LauncherResult<T> {
    let bytes = fetch_catalog_bytes(client, url).await?;
    serde_json::from_slice(&bytes).map_err(|source| LauncherError::CatalogFormat {
        url: url.to_string(),
        source,
    })
}

/// Raw body of a catalog document, with catalog error mapping.
pub async fn fetch_catalog_bytes(client: &Client, url: &str) -> LauncherResult<Vec<u8>> {
    log::debug!("Fetching catalog document: {}", url);
    let unavailable = |reason: String| LauncherError::CatalogUnavailable {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(unavailable(format!("HTTP {}", response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| unavailable(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Write `contents` to `path` through a temp file and rename.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> LauncherResult<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .await
            .map_err(|e| LauncherError::io(parent, e))?;
    }
    let tmp_path = part_path(path);
    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|e| LauncherError::io(&tmp_path, e))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| LauncherError::io(path, e))
}

pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
