//! In-memory registry

use super::api::PackageVersions;
use super::client::RegistryError;
use super::PackageRegistry;
use std::collections::HashMap;

/// Registry backed by a fixed set of packages
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    packages: HashMap<String, PackageVersions>,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package with the given versions
    pub fn with_package(mut self, name: &str, versions: &[&str]) -> Self {
        let entry = self.entry(name);
        entry.versions.extend(versions.iter().map(|v| v.to_string()));
        self
    }

    /// Point a dist-tag of a package at a version
    pub fn with_tag(mut self, name: &str, tag: &str, version: &str) -> Self {
        self.entry(name)
            .dist_tags
            .insert(tag.to_string(), version.to_string());
        self
    }

    fn entry(&mut self, name: &str) -> &mut PackageVersions {
        self.packages
            .entry(name.to_string())
            .or_insert_with(|| PackageVersions {
                name: name.to_string(),
                ..PackageVersions::default()
            })
    }
}

impl PackageRegistry for MemoryRegistry {
    fn versions(&self, name: &str) -> Result<PackageVersions, RegistryError> {
        self.packages
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::PackageNotFound(name.to_string()))
    }
}
