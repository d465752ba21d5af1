use super::variant::{classify_with_marker, ContentVariant};
use super::MatchCriteria;
use crate::models::VersionRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::fmt;

/// Maximum number of candidates listed in a no-match diagnostic.
pub const MAX_DIAGNOSTIC_CANDIDATES: usize = 10;

/// Summary of one catalog record, shown to the user when nothing matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub id: String,
    pub label: String,
    pub loaders: Vec<String>,
    pub game_versions: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    pub variant_hint: ContentVariant,
}

/// Matching failed. Carries the literal request plus enough of the catalog
/// to let the caller re-prompt with different criteria.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoMatchError {
    pub criteria: MatchCriteria,
    pub total_records: usize,
    pub after_loader_filter: usize,
    pub after_game_version_filter: usize,
    /// Up to ten of the most recently published records, newest first.
    pub candidates: Vec<CandidateSummary>,
}

impl NoMatchError {
    pub(crate) fn new(
        criteria: MatchCriteria,
        records: &[VersionRecord],
        after_loader_filter: usize,
        after_game_version_filter: usize,
    ) -> Self {
        let marker = criteria.variant_marker();

        let mut by_recency: Vec<&VersionRecord> = records.iter().collect();
        // Stable sort: records without a publish date keep catalog order at the end.
        by_recency.sort_by_key(|r| Reverse(r.published));

        let candidates = by_recency
            .into_iter()
            .take(MAX_DIAGNOSTIC_CANDIDATES)
            .map(|r| CandidateSummary {
                id: r.id.clone(),
                label: r.label.clone(),
                loaders: r.loaders.clone(),
                game_versions: r.game_versions.clone(),
                published: r.published,
                variant_hint: classify_with_marker(&marker, &r.label),
            })
            .collect();

        Self {
            criteria,
            total_records: records.len(),
            after_loader_filter,
            after_game_version_filter,
            candidates,
        }
    }
}

impl fmt::Display for NoMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "No version matches {} ({} records, {} after loader filter, {} after game version filter)",
            self.criteria,
            self.total_records,
            self.after_loader_filter,
            self.after_game_version_filter
        )?;

        if self.candidates.is_empty() {
            return write!(f, "The catalog returned no versions.");
        }

        write!(f, "Most recent versions available:")?;
        for c in &self.candidates {
            let published = c
                .published
                .map(|p| p.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unknown date".to_string());
            write!(
                f,
                "\n  - {} [{}] for {} ({}, {})",
                if c.label.is_empty() { &c.id } else { &c.label },
                c.loaders.join(", "),
                if c.game_versions.is_empty() {
                    "no game versions".to_string()
                } else {
                    c.game_versions.join(", ")
                },
                c.variant_hint,
                published
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for NoMatchError {}
