use std::collections::{BTreeMap, BTreeSet};

/// Canonical loader name -> accepted surface forms, all lower-case.
///
/// Only used for matching catalog loader tags; never persisted.
#[derive(Debug, Clone)]
pub struct LoaderAliasTable {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl Default for LoaderAliasTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register("fabric", &["fabric-loader", "fabricmc"]);
        table.register("quilt", &["quilt-loader", "quiltmc"]);
        table.register("forge", &["minecraftforge", "lexforge"]);
        table.register("neoforge", &["neo-forge", "neoforged"]);
        table
    }
}

impl LoaderAliasTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register `aliases` for `canonical`. The canonical name is always one of
    /// its own accepted forms.
    pub fn register(&mut self, canonical: &str, aliases: &[&str]) {
        let key = normalize(canonical);
        let forms = self.entries.entry(key.clone()).or_default();
        forms.insert(key);
        forms.extend(aliases.iter().map(|a| normalize(a)).filter(|a| !a.is_empty()));
    }

    /// Canonical name for a surface form, looking at keys first and then at
    /// every registered alias.
    pub fn canonical(&self, surface: &str) -> Option<&str> {
        let needle = normalize(surface);
        if let Some((key, _)) = self.entries.get_key_value(&needle) {
            return Some(key.as_str());
        }
        self.entries
            .iter()
            .find(|(_, forms)| forms.contains(&needle))
            .map(|(key, _)| key.as_str())
    }

    /// Every surface form equivalent to `loader`. An unknown loader expands to
    /// just its own normalized literal.
    pub fn expand(&self, loader: &str) -> BTreeSet<String> {
        match self.canonical(loader) {
            Some(key) => self.entries.get(key).cloned().unwrap_or_default(),
            None => {
                let mut single = BTreeSet::new();
                single.insert(normalize(loader));
                single
            }
        }
    }
}

pub(crate) fn normalize(tag: &str) -> String {
    tag.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_and_canonical_expand_identically() {
        let table = LoaderAliasTable::default();
        assert_eq!(table.expand("fabric"), table.expand("fabric-loader"));
        assert_eq!(table.expand("FabricMC "), table.expand("fabric"));
        assert!(table.expand("fabric").contains("fabric-loader"));
    }

    #[test]
    fn unknown_loader_is_its_own_literal() {
        let table = LoaderAliasTable::default();
        let forms = table.expand("  Rift ");
        assert_eq!(forms.len(), 1);
        assert!(forms.contains("rift"));
    }

    #[test]
    fn forge_and_neoforge_stay_apart() {
        let table = LoaderAliasTable::default();
        assert!(!table.expand("forge").contains("neoforge"));
        assert!(!table.expand("neoforge").contains("forge"));
        assert_eq!(table.canonical("neoforged"), Some("neoforge"));
    }
}
