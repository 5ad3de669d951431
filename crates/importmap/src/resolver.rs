//! Specifier resolution
//!
//! Rewrites an import specifier into a URL using an [`ImportMap`], the way a
//! module loader does for every import it encounters.

use crate::map::{ImportMap, SpecifierMap};
use std::cmp::Reverse;
use tracing::{debug, trace};
use url::Url;

/// Order in which candidate scopes are tried
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopeOrder {
    /// Most `/`-delimited path segments first.
    ///
    /// Scopes with the same segment count keep the order they were written
    /// in, so when `/a/` is listed before `/a/b` it is tried first for
    /// `/a/b/main.js` even though `/a/b` is longer.
    #[default]
    SegmentCount,

    /// Longest resolved path first
    PathLength,
}

/// Outcome of resolving a specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Mapped URL, or the original specifier when nothing matched
    pub url: String,
    /// Whether the import map remapped the specifier
    pub matched: bool,
}

impl Resolution {
    fn matched(url: String) -> Self {
        Self { url, matched: true }
    }

    fn unmatched(specifier: &str) -> Self {
        Self {
            url: specifier.to_string(),
            matched: false,
        }
    }
}

impl From<Resolution> for (String, bool) {
    fn from(resolution: Resolution) -> Self {
        (resolution.url, resolution.matched)
    }
}

/// Resolver over a borrowed import map
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    map: &'a ImportMap,
    scope_order: ScopeOrder,
}

/// A same-origin scope paired with its resolved path
struct CandidateScope<'a> {
    key: &'a str,
    path: String,
    imports: &'a SpecifierMap,
}

impl<'a> Resolver<'a> {
    /// Create a resolver with the default scope order
    pub fn new(map: &'a ImportMap) -> Self {
        Self {
            map,
            scope_order: ScopeOrder::default(),
        }
    }

    /// Set the scope order
    pub fn with_scope_order(mut self, scope_order: ScopeOrder) -> Self {
        self.scope_order = scope_order;
        self
    }

    /// Resolve `specifier` as imported from `containing_file`
    ///
    /// `containing_file` may be relative; it is resolved against the map's
    /// base URL. Resolution never fails: when no mapping applies the original
    /// specifier is returned with `matched = false`.
    pub fn resolve(&self, specifier: &str, containing_file: &str) -> Resolution {
        let base_url = self.map.base_url();
        let containing = match base_url.join(containing_file) {
            Ok(url) => url,
            Err(err) => {
                debug!(containing_file, error = %err, "containing file is not a valid URL");
                return Resolution::unmatched(specifier);
            }
        };
        let origin = origin_of(&containing);
        let path = containing.path();

        for scope in self.candidate_scopes(&origin) {
            if !path.starts_with(&scope.path) {
                continue;
            }
            if let Some(url) = match_specifier(specifier, scope.imports) {
                debug!(specifier, scope = scope.key, %url, "resolved from scope");
                return Resolution::matched(url);
            }
        }

        if origin_of(base_url) == origin {
            if let Some(url) = match_specifier(specifier, self.map.imports()) {
                debug!(specifier, %url, "resolved from imports");
                return Resolution::matched(url);
            }
        }

        trace!(specifier, containing_file, "specifier not mapped");
        Resolution::unmatched(specifier)
    }

    /// Same-origin scopes, most specific first
    fn candidate_scopes(&self, origin: &str) -> Vec<CandidateScope<'a>> {
        let base_url = self.map.base_url();
        let mut scopes: Vec<CandidateScope<'a>> = self
            .map
            .scopes()
            .iter()
            .filter_map(|(key, imports)| {
                let url = match base_url.join(key) {
                    Ok(url) => url,
                    Err(err) => {
                        debug!(scope = %key, error = %err, "skipping scope with invalid URL");
                        return None;
                    }
                };
                (origin_of(&url) == origin).then(|| CandidateScope {
                    key,
                    path: url.path().to_string(),
                    imports,
                })
            })
            .collect();

        match self.scope_order {
            ScopeOrder::SegmentCount => scopes.sort_by_key(|s| Reverse(s.path.split('/').count())),
            ScopeOrder::PathLength => scopes.sort_by_key(|s| Reverse(s.path.len())),
        }

        scopes
    }
}

/// Resolve with the default scope order
pub fn resolve(map: &ImportMap, specifier: &str, containing_file: &str) -> Resolution {
    Resolver::new(map).resolve(specifier, containing_file)
}

/// Match a specifier against a single imports table
///
/// An exact key returns its target unchanged. Otherwise keys ending in `/`
/// match by literal prefix and other keys match `key + "/"`; the target is
/// concatenated with the rest of the specifier. When several prefix keys
/// match, the longest prefix wins, and a `/`-terminated key wins a tie.
pub fn match_specifier(specifier: &str, imports: &SpecifierMap) -> Option<String> {
    if let Some(target) = imports.get(specifier) {
        return Some(target.clone());
    }

    let mut best: Option<PrefixMatch<'_>> = None;
    for (key, target) in imports {
        let Some(candidate) = PrefixMatch::new(specifier, key, target) else {
            continue;
        };
        if best.as_ref().map_or(true, |current| candidate.beats(current)) {
            best = Some(candidate);
        }
    }

    best.map(|m| format!("{}{}", m.target, &specifier[m.key.len()..]))
}

struct PrefixMatch<'a> {
    key: &'a str,
    target: &'a str,
    /// Length of the literal prefix the specifier had to start with
    prefix_len: usize,
    trailing_slash: bool,
}

impl<'a> PrefixMatch<'a> {
    fn new(specifier: &str, key: &'a str, target: &'a str) -> Option<Self> {
        if key.ends_with('/') {
            return specifier.starts_with(key).then_some(Self {
                key,
                target,
                prefix_len: key.len(),
                trailing_slash: true,
            });
        }
        let rest = specifier.strip_prefix(key)?;
        rest.starts_with('/').then_some(Self {
            key,
            target,
            prefix_len: key.len() + 1,
            trailing_slash: false,
        })
    }

    fn beats(&self, other: &PrefixMatch<'_>) -> bool {
        self.prefix_len > other.prefix_len
            || (self.prefix_len == other.prefix_len && self.trailing_slash && !other.trailing_slash)
    }
}

/// ASCII serialization of a URL's origin (`null` for opaque origins such as `file:`)
fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}
