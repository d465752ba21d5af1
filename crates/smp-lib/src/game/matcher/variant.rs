//! Content variant discrimination.
//!
//! The catalog has no field for the variant; the only signal is whether a
//! marker token appears in the free-text version label. This is a heuristic and
//! should give way to a real catalog attribute if one ever appears.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_VARIANT_MARKER: &str = "shader";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentVariant {
    /// Marker token absent from the label.
    Standard,
    /// Marker token present in the label.
    Shaders,
}

impl ContentVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentVariant::Standard => "standard",
            ContentVariant::Shaders => "shaders",
        }
    }
}

impl fmt::Display for ContentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ContentVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "plain" | "without-shaders" | "no-shaders" => Ok(ContentVariant::Standard),
            "shaders" | "shader" | "with-shaders" => Ok(ContentVariant::Shaders),
            other => Err(format!("Unknown content variant: {}", other)),
        }
    }
}

/// Substring rule selecting one variant by marker presence in the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantRule {
    marker: String,
    wanted: ContentVariant,
}

impl VariantRule {
    pub fn new(marker: &str, wanted: ContentVariant) -> Self {
        Self {
            marker: marker.trim().to_lowercase(),
            wanted,
        }
    }

    pub fn shaders(wanted: ContentVariant) -> Self {
        Self::new(DEFAULT_VARIANT_MARKER, wanted)
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn wanted(&self) -> ContentVariant {
        self.wanted
    }

    /// Variant a label belongs to under this rule's marker.
    pub fn classify(&self, label: &str) -> ContentVariant {
        classify_with_marker(&self.marker, label)
    }

    pub fn matches(&self, label: &str) -> bool {
        self.classify(label) == self.wanted
    }
}

pub(crate) fn classify_with_marker(marker: &str, label: &str) -> ContentVariant {
    if !marker.is_empty() && label.to_lowercase().contains(marker) {
        ContentVariant::Shaders
    } else {
        ContentVariant::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_presence_selects_variant() {
        let with = VariantRule::shaders(ContentVariant::Shaders);
        let without = VariantRule::shaders(ContentVariant::Standard);

        assert!(with.matches("2.1.0 Shaders Edition"));
        assert!(!with.matches("2.1.0"));
        assert!(without.matches("2.1.0"));
        assert!(!without.matches("2.1.0-SHADER"));
    }

    #[test]
    fn empty_marker_never_present() {
        let rule = VariantRule::new("  ", ContentVariant::Standard);
        assert!(rule.matches("anything"));
    }

    #[test]
    fn variant_parses_from_cli_forms() {
        assert_eq!("with-shaders".parse::<ContentVariant>().unwrap(), ContentVariant::Shaders);
        assert_eq!("Standard".parse::<ContentVariant>().unwrap(), ContentVariant::Standard);
        assert!("both".parse::<ContentVariant>().is_err());
    }
}
