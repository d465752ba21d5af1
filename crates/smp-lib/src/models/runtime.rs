//! Documents of the runtime distribution: the top-level manifest, the per-version
//! descriptor and the asset index it points to.

use super::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct RuntimeManifest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub versions: Vec<RuntimeManifestEntry>,
}

impl RuntimeManifest {
    /// Exact identifier lookup. No alias or prefix matching happens here.
    pub fn find(&self, id: &str) -> Option<&RuntimeManifestEntry> {
        self.versions.iter().find(|entry| entry.id == id)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RuntimeManifestEntry {
    pub id: String,
    /// Location of the detailed version descriptor.
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub release_type: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    pub id: String,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub downloads: DescriptorDownloads,
    #[serde(default, deserialize_with = "null_as_default")]
    pub libraries: Vec<LibraryDescriptor>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexRef>,
    #[serde(default)]
    pub assets: Option<String>,
}

impl VersionDescriptor {
    /// Identifier of the asset index, used for `--assetIndex` and the index file name.
    pub fn asset_index_id(&self) -> Option<&str> {
        self.asset_index
            .as_ref()
            .map(|idx| idx.id.as_str())
            .or(self.assets.as_deref())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct DescriptorDownloads {
    #[serde(default)]
    pub client: Option<DownloadRef>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DownloadRef {
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct LibraryDescriptor {
    /// Maven-style coordinate, `group:artifact:version[:classifier][@ext]`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<LibraryRule>,
}

impl LibraryDescriptor {
    pub fn artifact(&self) -> Option<&LibraryArtifact> {
        self.downloads.as_ref().and_then(|d| d.artifact.as_ref())
    }

    /// Evaluate the library's OS rules. No rules means allowed; otherwise the
    /// last matching rule decides.
    pub fn applies_to(&self, os_name: &str) -> bool {
        if self.rules.is_empty() {
            return true;
        }

        let mut allowed = false;
        for rule in &self.rules {
            let matches = rule
                .os
                .as_ref()
                .and_then(|os| os.name.as_deref())
                .map(|name| name == os_name)
                .unwrap_or(true);
            if matches {
                allowed = rule.action == RuleAction::Allow;
            }
        }
        allowed
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibraryArtifact>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LibraryArtifact {
    pub url: String,
    /// Install path relative to the libraries directory.
    pub path: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LibraryRule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AssetIndexRef {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct AssetIndexDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub objects: BTreeMap<String, AssetObject>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AssetObject {
    /// Content hash; doubles as the storage key and the remote object path.
    pub hash: String,
    #[serde(default)]
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library_with_rules(rules: &str) -> LibraryDescriptor {
        serde_json::from_str(&format!(
            r#"{{"name":"org.lwjgl:lwjgl:3.3.1","rules":{}}}"#,
            rules
        ))
        .unwrap()
    }

    #[test]
    fn library_without_rules_applies_everywhere() {
        let lib = library_with_rules("[]");
        assert!(lib.applies_to("linux"));
        assert!(lib.applies_to("windows"));
    }

    #[test]
    fn os_specific_allow() {
        let lib = library_with_rules(r#"[{"action":"allow","os":{"name":"osx"}}]"#);
        assert!(lib.applies_to("osx"));
        assert!(!lib.applies_to("linux"));
    }

    #[test]
    fn allow_then_disallow_for_one_os() {
        let lib = library_with_rules(
            r#"[{"action":"allow"},{"action":"disallow","os":{"name":"windows"}}]"#,
        );
        assert!(lib.applies_to("linux"));
        assert!(!lib.applies_to("windows"));
    }

    #[test]
    fn descriptor_tolerates_missing_sections() {
        let descriptor: VersionDescriptor = serde_json::from_str(r#"{"id":"1.20.1"}"#).unwrap();
        assert!(descriptor.downloads.client.is_none());
        assert!(descriptor.libraries.is_empty());
        assert!(descriptor.asset_index_id().is_none());
    }

    #[test]
    fn manifest_lookup_is_exact() {
        let manifest: RuntimeManifest = serde_json::from_str(
            r#"{"versions":[{"id":"1.20.1","url":"u1"},{"id":"1.20","url":"u2"}]}"#,
        )
        .unwrap();
        assert_eq!(manifest.find("1.20").unwrap().url, "u2");
        assert!(manifest.find("1.2").is_none());
        assert!(manifest.find("1.20.1 ").is_none());
    }
}
