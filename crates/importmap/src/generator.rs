//! Import map generator
//!
//! Adds, updates and removes packages in an import map by resolving package
//! versions against a registry and pointing specifiers at a CDN. Every
//! operation leaves its input untouched and returns a new, validated map, so
//! maps being read by resolvers are never mutated underneath them.

use crate::config::GeneratorConfig;
use crate::map::{ImportMap, ImportMapError, SpecifierMap};
use crate::registry::{PackageRegistry, PackageVersions, RegistryError};
use semver::{Version, VersionReq};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Errors that can occur while generating an import map
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Invalid package specifier
    #[error("Invalid package specifier: {0}")]
    InvalidSpecifier(String),

    /// Version range could not be parsed
    #[error("Invalid version range '{range}': {source}")]
    InvalidRange {
        range: String,
        #[source]
        source: semver::Error,
    },

    /// No published version satisfies the request
    #[error("No version of {package} matches '{range}'")]
    NoMatchingVersion { package: String, range: String },

    /// Package is not mapped by the import map
    #[error("Package not in import map: {0}")]
    NotInMap(String),

    /// Registry error
    #[error("Registry error: {0}")]
    RegistryError(#[from] RegistryError),

    /// Import map error
    #[error("Import map error: {0}")]
    ImportMapError(#[from] ImportMapError),
}

/// Parsed package specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpecifier {
    /// Package name (may include scope like @org/package)
    pub name: String,

    /// Version, range or dist-tag (if specified)
    pub range: Option<String>,
}

impl PackageSpecifier {
    /// Parse a package specifier string
    ///
    /// Formats:
    /// - `package` - latest version
    /// - `package@1.2.3` - exact version
    /// - `package@^1.2.0` - version range
    /// - `package@next` - dist-tag
    /// - `@org/package@1.0.0` - scoped package
    pub fn parse(spec: &str) -> Result<Self, GeneratorError> {
        let spec = spec.trim();

        if spec.is_empty() {
            return Err(GeneratorError::InvalidSpecifier("empty specifier".to_string()));
        }

        // Scoped packages start with '@', so the version separator is the
        // next '@' after the scope
        let search_from = usize::from(spec.starts_with('@'));
        let (name, range) = match spec[search_from..].find('@') {
            Some(pos) => {
                let at = pos + search_from;
                (&spec[..at], Some(&spec[at + 1..]))
            }
            None => (spec, None),
        };

        if name.is_empty() || name == "@" {
            return Err(GeneratorError::InvalidSpecifier(format!(
                "empty package name in '{}'",
                spec
            )));
        }

        if name.starts_with('@') && !name.contains('/') {
            return Err(GeneratorError::InvalidSpecifier(format!(
                "scoped package '{}' is missing a name",
                name
            )));
        }

        if range == Some("") {
            return Err(GeneratorError::InvalidSpecifier(format!(
                "empty version in '{}'",
                spec
            )));
        }

        Ok(Self {
            name: name.to_string(),
            range: range.map(String::from),
        })
    }
}

/// Import map generator
#[derive(Debug)]
pub struct Generator<R> {
    config: GeneratorConfig,
    registry: R,
}

impl<R: PackageRegistry> Generator<R> {
    /// Create a generator
    pub fn new(config: GeneratorConfig, registry: R) -> Self {
        Self { config, registry }
    }

    /// Generator configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// CDN URL for a package version (no trailing slash)
    pub fn package_url(&self, name: &str, version: &Version) -> String {
        format!("{}/{}@{}", self.config.cdn_origin, name, version)
    }

    /// Add a package to the top-level imports
    ///
    /// Maps both `name` and `name/` so that subpath imports resolve too.
    pub fn add(&self, map: &ImportMap, spec: &str) -> Result<ImportMap, GeneratorError> {
        let spec = PackageSpecifier::parse(spec)?;
        let version = self.resolve_version(&spec.name, spec.range.as_deref())?;

        let mut updated = map.clone();
        self.pin(&mut updated, &spec.name, &version)?;

        info!(package = %spec.name, %version, "added package");
        Ok(updated)
    }

    /// Move a mapped package to another version
    ///
    /// Rewrites the top-level entries and any scoped entries for the package
    /// that point at the configured CDN.
    pub fn update(
        &self,
        map: &ImportMap,
        name: &str,
        version: &str,
    ) -> Result<ImportMap, GeneratorError> {
        let dir_key = format!("{}/", name);
        let in_scopes = map
            .scopes()
            .values()
            .any(|imports| imports.contains_key(name) || imports.contains_key(&dir_key));
        if !map.imports().contains_key(name) && !map.imports().contains_key(&dir_key) && !in_scopes {
            return Err(GeneratorError::NotInMap(name.to_string()));
        }

        let resolved = self.resolve_version(name, Some(version))?;
        let mut updated = map.clone();
        // A package mapped only in scopes stays scoped
        if map.imports().contains_key(name) || map.imports().contains_key(&dir_key) {
            self.pin(&mut updated, name, &resolved)?;
        }

        let base = self.package_url(name, &resolved);
        let mut rewrites = Vec::new();
        for (scope, imports) in map.scopes() {
            for key in [name, dir_key.as_str()] {
                let Some(target) = imports.get(key) else {
                    continue;
                };
                if !self.is_cdn_url(target) {
                    debug!(scope = %scope, key, %target, "keeping non-CDN scoped entry");
                    continue;
                }
                let new_target = if key.ends_with('/') {
                    format!("{}/", base)
                } else {
                    base.clone()
                };
                rewrites.push((scope.clone(), key.to_string(), new_target));
            }
        }
        for (scope, key, target) in rewrites {
            updated.insert_scoped(scope, key, target)?;
        }

        info!(package = name, version = %resolved, "updated package");
        Ok(updated)
    }

    /// Remove a package from the imports and every scope
    ///
    /// Scopes left empty by the removal are dropped.
    pub fn remove(&self, map: &ImportMap, name: &str) -> Result<ImportMap, GeneratorError> {
        let dir_key = format!("{}/", name);
        let mut updated = map.clone();
        let mut removed = 0;

        for key in [name, dir_key.as_str()] {
            removed += usize::from(updated.remove_import(key).is_some());
        }

        let scopes: Vec<String> = map.scopes().keys().cloned().collect();
        let mut emptied = Vec::new();
        for scope in &scopes {
            let mut removed_here = 0;
            for key in [name, dir_key.as_str()] {
                removed_here += usize::from(updated.remove_scoped(scope, key).is_some());
            }
            if removed_here > 0 && updated.scopes().get(scope).is_some_and(|s| s.is_empty()) {
                emptied.push(scope.clone());
            }
            removed += removed_here;
        }

        if removed == 0 {
            return Err(GeneratorError::NotInMap(name.to_string()));
        }

        for scope in emptied {
            updated.remove_scope(&scope);
        }

        info!(package = name, entries = removed, "removed package");
        Ok(updated)
    }

    /// Tidy an import map without consulting the registry
    ///
    /// Removes scoped entries that duplicate a top-level entry when removing
    /// them cannot change any resolution, then drops empty scopes.
    pub fn tidy(&self, map: &ImportMap) -> Result<ImportMap, GeneratorError> {
        let base_origin = map.base_url().origin().ascii_serialization();
        let scope_urls: Vec<(&str, &SpecifierMap, Url)> = map
            .scopes()
            .iter()
            .filter_map(|(scope, imports)| {
                let url = map.base_url().join(scope).ok()?;
                Some((scope.as_str(), imports, url))
            })
            .collect();

        let mut redundant = Vec::new();
        for (scope, imports, url) in &scope_urls {
            let origin = url.origin().ascii_serialization();
            if origin != base_origin {
                continue;
            }

            // Scopes that can qualify for the same containing files
            let nested: Vec<&SpecifierMap> = scope_urls
                .iter()
                .filter(|(other, _, other_url)| {
                    other != scope
                        && other_url.origin().ascii_serialization() == origin
                        && (other_url.path().starts_with(url.path())
                            || url.path().starts_with(other_url.path()))
                })
                .map(|(_, other_imports, _)| *other_imports)
                .collect();

            for (key, target) in imports.iter() {
                if map.imports().get(key) != Some(target) {
                    continue;
                }
                let shadowed = claimed_by(key, imports, true)
                    || claimed_by(key, map.imports(), true)
                    || nested.iter().any(|other| claimed_by(key, other, false));
                if shadowed {
                    debug!(scope = %scope, key = %key, "keeping duplicate entry with overlapping keys");
                    continue;
                }
                redundant.push((scope.to_string(), key.clone()));
            }
        }

        let mut updated = map.clone();
        for (scope, key) in &redundant {
            updated.remove_scoped(scope, key);
        }
        let pruned = updated.prune_empty_scopes();

        let report = updated.validate();
        if !report.is_empty() {
            warn!(dropped = report.len(), "tidy dropped invalid entries");
        }

        info!(entries = redundant.len(), scopes = pruned, "tidied import map");
        Ok(updated)
    }

    /// Pin `name` and `name/` in the top-level imports
    fn pin(&self, map: &mut ImportMap, name: &str, version: &Version) -> Result<(), GeneratorError> {
        let url = self.package_url(name, version);
        map.insert_import(name, url.clone())?;
        map.insert_import(format!("{}/", name), format!("{}/", url))?;
        Ok(())
    }

    /// Whether `target` is served from the configured CDN origin
    fn is_cdn_url(&self, target: &str) -> bool {
        Url::parse(target)
            .map(|url| url.origin().ascii_serialization() == self.config.cdn_origin)
            .unwrap_or(false)
    }

    /// Pick the version to use for `name`
    ///
    /// No range selects the `latest` dist-tag, falling back to the highest
    /// stable version. A dist-tag name selects that tag, an exact version must
    /// be published, and anything else is treated as a semver range.
    pub fn resolve_version(&self, name: &str, range: Option<&str>) -> Result<Version, GeneratorError> {
        let versions = self.registry.versions(name)?;
        let no_match = || GeneratorError::NoMatchingVersion {
            package: name.to_string(),
            range: range.unwrap_or("latest").to_string(),
        };

        let mut published: Vec<Version> = versions
            .versions
            .iter()
            .filter_map(|v| Version::parse(v).ok())
            .collect();
        published.sort();

        let selected = match range {
            None => tagged(&versions, "latest")
                .or_else(|| published.iter().rev().find(|v| v.pre.is_empty()).cloned()),
            Some(range) => {
                if let Some(version) = tagged(&versions, range) {
                    Some(version)
                } else if let Ok(exact) = Version::parse(range.trim_start_matches(['=', 'v'])) {
                    published.into_iter().find(|v| *v == exact)
                } else {
                    let req = VersionReq::parse(range).map_err(|source| GeneratorError::InvalidRange {
                        range: range.to_string(),
                        source,
                    })?;
                    published.into_iter().rev().find(|v| req.matches(v))
                }
            }
        };

        let version = selected.ok_or_else(no_match)?;
        debug!(package = name, range = range.unwrap_or("latest"), %version, "selected version");
        Ok(version)
    }
}

/// Whether another key in `imports` could match a specifier that `key` matches
fn claimed_by(key: &str, imports: &SpecifierMap, skip_self: bool) -> bool {
    imports
        .keys()
        .filter(|other| !(skip_self && other.as_str() == key))
        .any(|other| keys_overlap(key, other))
}

fn tagged(versions: &PackageVersions, tag: &str) -> Option<Version> {
    versions
        .dist_tags
        .get(tag)
        .and_then(|v| Version::parse(v).ok())
}

/// Literal prefix a key requires of a specifier it matches by prefix
fn match_prefix(key: &str) -> String {
    if key.ends_with('/') {
        key.to_string()
    } else {
        format!("{}/", key)
    }
}

/// Whether some specifier could be matched by both keys
fn keys_overlap(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (pa, pb) = (match_prefix(a), match_prefix(b));
    pa.starts_with(&pb)
        || pb.starts_with(&pa)
        || (!a.ends_with('/') && a.starts_with(&pb))
        || (!b.ends_with('/') && b.starts_with(&pa))
}
