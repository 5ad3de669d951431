//! Registry API types
//!
//! Response types for the npm registry package document ("packument").

use serde::de::IgnoredAny;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Package document
///
/// Response from GET /{name}. Only the fields needed for version selection
/// are read; per-version manifests are skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct Packument {
    /// Package name
    pub name: String,

    /// Tag -> version (e.g. `latest`, `next`)
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: BTreeMap<String, String>,

    /// Published versions
    #[serde(default)]
    pub versions: HashMap<String, IgnoredAny>,
}

/// Versions known for a package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageVersions {
    /// Package name
    pub name: String,

    /// Tag -> version
    pub dist_tags: BTreeMap<String, String>,

    /// Published version strings, unordered
    pub versions: Vec<String>,
}

impl PackageVersions {
    /// Version behind the `latest` tag
    pub fn latest(&self) -> Option<&str> {
        self.dist_tags.get("latest").map(String::as_str)
    }
}

impl From<Packument> for PackageVersions {
    fn from(packument: Packument) -> Self {
        Self {
            name: packument.name,
            dist_tags: packument.dist_tags,
            versions: packument.versions.into_keys().collect(),
        }
    }
}
