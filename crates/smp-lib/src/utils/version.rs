use std::cmp::Ordering;
use std::fmt;

/// Numeric version parsed from a free-text catalog label.
///
/// Only the dotted-numeric prefix before any `+build` or `-prerelease` suffix
/// counts, so "2.0.9-beta" and "2.0.9" compare equal. Labels that do not parse
/// become 0.0.0 and therefore sort as the oldest.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct LabelVersion(Vec<u64>);

impl LabelVersion {
    pub fn zero() -> Self {
        LabelVersion(Vec::new())
    }

    pub fn parse(label: &str) -> Self {
        let clean = label.trim().trim_start_matches(['v', 'V']);
        let without_build = clean.split('+').next().unwrap_or_default();
        let numeric = without_build.split('-').next().unwrap_or_default();

        let mut parts = Vec::new();
        for piece in numeric.split('.') {
            if piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_digit()) {
                return Self::zero();
            }
            match piece.parse::<u64>() {
                Ok(n) => parts.push(n),
                Err(_) => return Self::zero(),
            }
        }

        // Trailing zeros carry no ordering weight: 1.20 == 1.20.0
        while parts.last() == Some(&0) {
            parts.pop();
        }
        LabelVersion(parts)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

impl Ord for LabelVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // With trailing zeros trimmed, lexicographic order is numeric order.
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for LabelVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LabelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.0.iter().map(|n| n.to_string()).collect();
        while parts.len() < 3 {
            parts.push("0".to_string());
        }
        write!(f, "{}", parts.join("."))
    }
}

pub fn compare_labels(a: &str, b: &str) -> Ordering {
    LabelVersion::parse(a).cmp(&LabelVersion::parse(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_ordering() {
        assert_eq!(compare_labels("2.1.0", "2.0.9"), Ordering::Greater);
        assert_eq!(compare_labels("2.0.9", "2.0.9-beta"), Ordering::Equal);
        assert_eq!(compare_labels("2.0.10", "2.0.9"), Ordering::Greater);
        assert_eq!(compare_labels("1.20", "1.20.0"), Ordering::Equal);
        assert_eq!(compare_labels("1.20.0", "1.20.1"), Ordering::Less);
    }

    #[test]
    fn test_suffixes_are_stripped() {
        assert_eq!(LabelVersion::parse("3.2.1+build.7").to_string(), "3.2.1");
        assert_eq!(LabelVersion::parse("v1.4-rc1").to_string(), "1.4.0");
        assert_eq!(LabelVersion::parse(" V2 ").to_string(), "2.0.0");
    }

    #[test]
    fn test_unparsable_is_zero() {
        assert!(LabelVersion::parse("banana").is_zero());
        assert!(LabelVersion::parse("").is_zero());
        assert!(LabelVersion::parse("1..2").is_zero());
        assert!(LabelVersion::parse("1.2.x").is_zero());
        assert_eq!(LabelVersion::parse("banana").to_string(), "0.0.0");
        assert_eq!(compare_labels("banana", "0.0.1"), Ordering::Less);
    }
}
