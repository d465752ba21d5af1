use crate::game::installer::core::downloader::download_to_path;
use crate::game::installer::types::ProgressReporter;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct BatchArtifact {
    pub name: String,
    pub url: String,
    pub path: PathBuf,
    pub sha1: Option<String>,
}

/// A single item the batch could not fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub name: String,
    pub url: String,
    pub reason: String,
}

/// Outcome of a best-effort batch. `downloaded + skipped + failed` equals the
/// number of distinct destination paths that were submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchTally {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<FailedItem>,
}

impl BatchTally {
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

enum ItemOutcome {
    Downloaded,
    Skipped,
    Failed(FailedItem),
}

pub struct BatchDownloader {
    client: Client,
    concurrency: usize,
    attempts: u32,
    checkpoint_interval: usize,
}

impl BatchDownloader {
    pub fn new(client: Client, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
            attempts: crate::config::DOWNLOAD_RETRIES,
            checkpoint_interval: crate::config::PROGRESS_CHECKPOINT_INTERVAL,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval.max(1);
        self
    }

    /// Download every artifact whose destination does not exist yet.
    ///
    /// Never fails as a whole: each item's error is logged at `failure_level`
    /// and recorded in the tally, and the loop moves on. Items sharing a
    /// destination path are collapsed to the first one.
    pub async fn download_all(
        &self,
        artifacts: Vec<BatchArtifact>,
        reporter: Arc<dyn ProgressReporter>,
        label: &str,
        failure_level: log::Level,
    ) -> BatchTally {
        // Deduplicate artifacts by path to avoid concurrent writes to the same file
        let mut unique_artifacts = Vec::new();
        let mut seen_paths = HashSet::new();
        for artifact in artifacts {
            if seen_paths.insert(artifact.path.clone()) {
                unique_artifacts.push(artifact);
            }
        }

        let total = unique_artifacts.len();
        let mut tally = BatchTally::default();
        if total == 0 {
            return tally;
        }

        let processed = Arc::new(AtomicUsize::new(0));
        reporter.set_step_count(0, Some(total as u32));

        let outcomes = stream::iter(unique_artifacts)
            .map(|artifact| {
                let client = self.client.clone();
                let reporter = reporter.clone();
                let processed = processed.clone();
                let attempts = self.attempts;
                let interval = self.checkpoint_interval;

                async move {
                    let outcome = if tokio::fs::try_exists(&artifact.path)
                        .await
                        .unwrap_or(false)
                    {
                        ItemOutcome::Skipped
                    } else if reporter.is_cancelled() {
                        ItemOutcome::Failed(FailedItem {
                            name: artifact.name.clone(),
                            url: artifact.url.clone(),
                            reason: "cancelled by user".to_string(),
                        })
                    } else {
                        match download_to_path(
                            &client,
                            &artifact.url,
                            &artifact.path,
                            artifact.sha1.as_deref(),
                            attempts,
                            &*reporter,
                        )
                        .await
                        {
                            Ok(_) => ItemOutcome::Downloaded,
                            Err(e) => {
                                log::log!(
                                    failure_level,
                                    "Failed to download {} from {}: {}",
                                    artifact.name,
                                    artifact.url,
                                    e
                                );
                                ItemOutcome::Failed(FailedItem {
                                    name: artifact.name.clone(),
                                    url: artifact.url.clone(),
                                    reason: e.to_string(),
                                })
                            }
                        }
                    };

                    let count = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    reporter.set_step_count(count as u32, Some(total as u32));
                    if count % interval == 0 || count == total {
                        log::info!("{} progress: {}/{}", label, count, total);
                        reporter.set_message(&format!("{}... ({}/{})", label, count, total));
                    }

                    outcome
                }
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        for outcome in outcomes {
            match outcome {
                ItemOutcome::Downloaded => tally.downloaded += 1,
                ItemOutcome::Skipped => tally.skipped += 1,
                ItemOutcome::Failed(item) => {
                    tally.failed += 1;
                    tally.failures.push(item);
                }
            }
        }

        log::info!(
            "{} finished: {} downloaded, {} already present, {} failed",
            label,
            tally.downloaded,
            tally.skipped,
            tally.failed
        );
        tally
    }
}
