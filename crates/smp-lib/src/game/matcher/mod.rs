//! Picks exactly one catalog version for a user's selection.
//!
//! Pure logic: filtering by loader (through the alias table), by game version
//! (exact or dotted-prefix) and by content variant, then choosing the newest
//! survivor by parsed label, publish date and catalog order.

pub mod alias;
pub mod diagnostics;
pub mod variant;

pub use alias::LoaderAliasTable;
pub use diagnostics::{CandidateSummary, NoMatchError, MAX_DIAGNOSTIC_CANDIDATES};
pub use variant::{ContentVariant, VariantRule, DEFAULT_VARIANT_MARKER};

use crate::models::VersionRecord;
use crate::utils::version::LabelVersion;
use alias::normalize;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// What the user asked for, echoed verbatim in diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCriteria {
    pub loader: String,
    pub game_version: Option<String>,
    pub variant: Option<VariantRule>,
}

impl MatchCriteria {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            game_version: None,
            variant: None,
        }
    }

    /// Blank game versions mean "any", matching the "latest version" choice
    /// in a picker.
    pub fn with_game_version(mut self, game_version: Option<&str>) -> Self {
        self.game_version = game_version
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_variant(mut self, variant: Option<VariantRule>) -> Self {
        self.variant = variant;
        self
    }

    pub(crate) fn variant_marker(&self) -> String {
        self.variant
            .as_ref()
            .map(|v| v.marker().to_string())
            .unwrap_or_else(|| DEFAULT_VARIANT_MARKER.to_string())
    }
}

impl fmt::Display for MatchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loader '{}', game version '{}', variant '{}'",
            self.loader,
            self.game_version.as_deref().unwrap_or("any"),
            self.variant
                .as_ref()
                .map(|v| v.wanted().to_string())
                .unwrap_or_else(|| "any".to_string())
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct VersionMatcher {
    aliases: LoaderAliasTable,
}

impl VersionMatcher {
    pub fn new(aliases: LoaderAliasTable) -> Self {
        Self { aliases }
    }

    /// Select the newest record satisfying `criteria`.
    ///
    /// Deterministic for a given input order: ties on parsed version and
    /// publish date go to the record encountered first.
    pub fn select_latest<'a>(
        &self,
        records: &'a [VersionRecord],
        criteria: &MatchCriteria,
    ) -> Result<&'a VersionRecord, NoMatchError> {
        let accepted = self.aliases.expand(&criteria.loader);

        let by_loader: Vec<&VersionRecord> = records
            .iter()
            .filter(|r| r.loaders.iter().any(|tag| accepted.contains(&normalize(tag))))
            .collect();
        let after_loader = by_loader.len();

        let by_game_version: Vec<&VersionRecord> = match criteria.game_version.as_deref() {
            Some(wanted) => by_loader
                .into_iter()
                .filter(|r| targets_game_version(r, wanted))
                .collect(),
            None => by_loader,
        };
        let after_game_version = by_game_version.len();

        let survivors: Vec<&VersionRecord> = match criteria.variant.as_ref() {
            Some(rule) => by_game_version
                .into_iter()
                .filter(|r| rule.matches(&r.label))
                .collect(),
            None => by_game_version,
        };

        log::debug!(
            "Matching {}: {} records, {} by loader, {} by game version, {} by variant",
            criteria,
            records.len(),
            after_loader,
            after_game_version,
            survivors.len()
        );

        pick_newest(survivors).ok_or_else(|| {
            NoMatchError::new(criteria.clone(), records, after_loader, after_game_version)
        })
    }
}

/// Convenience wrapper using the default alias table.
pub fn select_latest<'a>(
    records: &'a [VersionRecord],
    loader: &str,
    game_version: Option<&str>,
    variant: Option<VariantRule>,
) -> Result<&'a VersionRecord, NoMatchError> {
    let criteria = MatchCriteria::new(loader)
        .with_game_version(game_version)
        .with_variant(variant);
    VersionMatcher::default().select_latest(records, &criteria)
}

/// A tag matches the requested version exactly or as a dotted refinement of
/// it: "1.20" accepts "1.20.1" but "1.20.1" does not accept "1.20".
fn targets_game_version(record: &VersionRecord, wanted: &str) -> bool {
    let wanted = normalize(wanted);
    let dotted = format!("{}.", wanted);
    record.game_versions.iter().any(|tag| {
        let tag = normalize(tag);
        tag == wanted || tag.starts_with(&dotted)
    })
}

fn pick_newest(candidates: Vec<&VersionRecord>) -> Option<&VersionRecord> {
    let mut best: Option<(&VersionRecord, LabelVersion)> = None;
    for record in candidates {
        let parsed = LabelVersion::parse(&record.label);
        let replace = match &best {
            None => true,
            Some((current, current_version)) => {
                match parsed.cmp(current_version) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    // Later publish date wins; equal dates keep the earlier record.
                    Ordering::Equal => record.published > current.published,
                }
            }
        };
        if replace {
            best = Some((record, parsed));
        }
    }
    best.map(|(record, _)| record)
}

/// Distinct game versions across all records, newest first. Feeds a version
/// picker.
pub fn available_game_versions(records: &[VersionRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut versions: Vec<String> = records
        .iter()
        .flat_map(|r| r.game_versions.iter())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.to_string()))
        .map(str::to_string)
        .collect();

    versions.sort_by(|a, b| {
        LabelVersion::parse(b)
            .cmp(&LabelVersion::parse(a))
            .then_with(|| b.cmp(a))
    });
    versions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, label: &str, loaders: &[&str], games: &[&str], day: u32) -> VersionRecord {
        VersionRecord {
            id: id.to_string(),
            label: label.to_string(),
            loaders: loaders.iter().map(|s| s.to_string()).collect(),
            game_versions: games.iter().map(|s| s.to_string()).collect(),
            published: Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
            version_type: "release".to_string(),
            files: Vec::new(),
        }
    }

    fn catalog() -> Vec<VersionRecord> {
        vec![
            record("a", "2.0.9", &["fabric"], &["1.20.1"], 1),
            record("b", "2.1.0", &["Fabric"], &["1.20.1"], 2),
            record("c", "2.1.0 shaders", &["fabric"], &["1.20.1"], 3),
            record("d", "3.0.0", &["forge"], &["1.20.1"], 4),
            record("e", "1.9.0", &["fabric"], &["1.19.4"], 5),
        ]
    }

    #[test]
    fn test_aliases_are_equivalent() {
        let records = catalog();
        let a = select_latest(&records, "fabric", None, None).unwrap();
        let b = select_latest(&records, "fabric-loader", None, None).unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_selection_is_idempotent() {
        let records = catalog();
        let criteria = MatchCriteria::new("fabric").with_game_version(Some("1.20"));
        let matcher = VersionMatcher::default();
        let first = matcher.select_latest(&records, &criteria).unwrap();
        let second = matcher.select_latest(&records, &criteria).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_newest_label_wins_then_timestamp() {
        let records = catalog();
        // "2.1.0" and "2.1.0 shaders" (unparsable -> 0.0.0) : plain 2.1.0 wins
        let picked = select_latest(&records, "fabric", Some("1.20.1"), None).unwrap();
        assert_eq!(picked.id, "b");
    }

    #[test]
    fn test_prerelease_ties_broken_by_timestamp() {
        let records = vec![
            record("old", "2.0.9", &["fabric"], &["1.20.1"], 1),
            record("new", "2.0.9-beta", &["fabric"], &["1.20.1"], 9),
        ];
        assert_eq!(select_latest(&records, "fabric", None, None).unwrap().id, "new");
    }

    #[test]
    fn test_full_tie_keeps_first_encountered() {
        let records = vec![
            record("first", "1.0.0", &["fabric"], &[], 1),
            record("second", "1.0.0+build", &["fabric"], &[], 1),
        ];
        assert_eq!(select_latest(&records, "fabric", None, None).unwrap().id, "first");
    }

    #[test]
    fn test_unparsable_label_loses() {
        let records = vec![
            record("fruit", "banana", &["fabric"], &[], 20),
            record("real", "0.0.1", &["fabric"], &[], 1),
        ];
        assert_eq!(select_latest(&records, "fabric", None, None).unwrap().id, "real");
    }

    #[test]
    fn test_game_version_prefix_is_asymmetric() {
        let records = vec![record("x", "1.0.0", &["fabric"], &["1.20.1"], 1)];
        assert!(select_latest(&records, "fabric", Some("1.20"), None).is_ok());

        let records = vec![record("y", "1.0.0", &["fabric"], &["1.20"], 1)];
        assert!(select_latest(&records, "fabric", Some("1.20.1"), None).is_err());

        // "1.2" must not accept "1.20"
        let records = vec![record("z", "1.0.0", &["fabric"], &["1.20"], 1)];
        assert!(select_latest(&records, "fabric", Some("1.2"), None).is_err());
    }

    #[test]
    fn test_variant_rule_filters_on_label() {
        let records = catalog();
        let shaders = select_latest(
            &records,
            "fabric",
            None,
            Some(VariantRule::shaders(ContentVariant::Shaders)),
        )
        .unwrap();
        assert_eq!(shaders.id, "c");

        let standard = select_latest(
            &records,
            "fabric",
            None,
            Some(VariantRule::shaders(ContentVariant::Standard)),
        )
        .unwrap();
        assert_eq!(standard.id, "b");
    }

    #[test]
    fn test_blank_game_version_means_any() {
        let records = catalog();
        let picked = select_latest(&records, "fabric", Some("  "), None).unwrap();
        assert_eq!(picked.id, "b");
    }

    #[test]
    fn test_no_match_diagnostics_are_capped() {
        let records: Vec<VersionRecord> = (1..=15)
            .map(|i| record(&format!("v{}", i), &format!("1.0.{}", i), &["forge"], &["1.20.1"], i))
            .collect();

        let err = select_latest(&records, "neoforge", Some("1.20.1"), None).unwrap_err();
        assert_eq!(err.candidates.len(), MAX_DIAGNOSTIC_CANDIDATES);
        assert_eq!(err.total_records, 15);
        assert_eq!(err.after_loader_filter, 0);
        assert_eq!(err.criteria.loader, "neoforge");
        assert_eq!(err.criteria.game_version.as_deref(), Some("1.20.1"));
        // newest first
        assert_eq!(err.candidates[0].id, "v15");

        let text = err.to_string();
        assert!(text.contains("loader 'neoforge'"));
        assert!(text.contains("game version '1.20.1'"));
    }

    #[test]
    fn test_records_without_loaders_never_match() {
        let records = vec![record("bare", "9.9.9", &[], &["1.20.1"], 1)];
        let err = select_latest(&records, "fabric", None, None).unwrap_err();
        assert_eq!(err.candidates.len(), 1);
        assert_eq!(err.candidates[0].variant_hint, ContentVariant::Standard);
    }

    #[test]
    fn test_available_game_versions_sorted_newest_first() {
        let mut records = catalog();
        records.push(record("f", "1.0.0", &["fabric"], &[" 1.20.1 ", "1.20", ""], 6));
        assert_eq!(
            available_game_versions(&records),
            vec!["1.20.1".to_string(), "1.20".to_string(), "1.19.4".to_string()]
        );
    }
}
