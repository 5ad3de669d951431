//! Import map data model
//!
//! Construction, validation and comparison of import maps as described at
//! <https://wicg.github.io/import-maps/>.
//!
//! Externally supplied `imports` and `scopes` are sanitized rather than
//! rejected: entries that are not non-empty strings are dropped and recorded
//! in a [`SanitizeReport`]. Callers that want hard failures can opt into
//! [`Strictness::Strict`].

use crate::html;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Anchor that relative or missing base URLs are resolved against
pub const NEUTRAL_ANCHOR: &str = "file:///";

/// Specifier -> target URL table, in the order the entries were written
pub type SpecifierMap = IndexMap<String, String>;

/// Scope key -> specifier table, in the order the scopes were written
pub type ScopesMap = IndexMap<String, SpecifierMap>;

/// Errors that can occur while building an import map
#[derive(Debug, Error)]
pub enum ImportMapError {
    /// Base URL could not be resolved to an absolute URL
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Import map text is not valid JSON
    #[error("Failed to parse import map JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Strict construction found entries that would have been dropped
    #[error("Import map contains invalid entries: {0}")]
    InvalidEntries(SanitizeReport),

    /// Attempted to map a specifier to an empty target
    #[error("Empty target URL for specifier '{0}'")]
    EmptyTarget(String),
}

/// How construction treats entries that fail validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Drop invalid entries and report them
    #[default]
    Lenient,
    /// Fail construction if any entry was dropped
    Strict,
}

/// Why an entry was dropped during validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Import value was not a string
    NotAString,
    /// Import value was an empty string
    EmptyString,
    /// Scope value was not an object
    NotAnObject,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NotAString => write!(f, "value is not a string"),
            DropReason::EmptyString => write!(f, "value is an empty string"),
            DropReason::NotAnObject => write!(f, "scope is not an object"),
        }
    }
}

/// A single entry removed during validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedEntry {
    /// Scope the entry belonged to (`None` for top-level imports and for
    /// scopes that were dropped as a whole)
    pub scope: Option<String>,
    /// Specifier or scope key that was dropped
    pub key: String,
    /// Why it was dropped
    pub reason: DropReason,
}

impl fmt::Display for DroppedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.scope, self.reason) {
            (_, DropReason::NotAnObject) => write!(f, "scopes[{:?}]: {}", self.key, self.reason),
            (Some(scope), _) => write!(f, "scopes[{:?}][{:?}]: {}", scope, self.key, self.reason),
            (None, _) => write!(f, "imports[{:?}]: {}", self.key, self.reason),
        }
    }
}

/// Entries dropped while validating an import map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub dropped: Vec<DroppedEntry>,
}

impl SanitizeReport {
    /// Whether nothing was dropped
    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty()
    }

    /// Number of dropped entries
    pub fn len(&self) -> usize {
        self.dropped.len()
    }

    fn push(&mut self, scope: Option<&str>, key: &str, reason: DropReason) {
        self.dropped.push(DroppedEntry {
            scope: scope.map(String::from),
            key: key.to_string(),
            reason,
        });
    }
}

impl fmt::Display for SanitizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self.dropped.iter().map(ToString::to_string).collect();
        write!(f, "{}", entries.join(", "))
    }
}

/// Options for building an import map
#[derive(Debug, Clone, Default)]
pub struct ImportMapOptions {
    /// Base URL, resolved against [`NEUTRAL_ANCHOR`]
    pub base_url: Option<String>,
    /// Treatment of invalid entries
    pub strictness: Strictness,
    /// Provenance tag carried on the map
    pub src: Option<String>,
}

impl ImportMapOptions {
    /// Options with the given base URL and defaults otherwise
    pub fn with_base_url(base_url: Option<&str>) -> Self {
        Self {
            base_url: base_url.map(String::from),
            ..Self::default()
        }
    }

    /// Set the strictness level
    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Set the provenance tag
    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }
}

/// A validated import map
///
/// Every target in `imports` and in each scope is a non-empty string, and the
/// base URL is always absolute.
#[derive(Debug, Clone)]
pub struct ImportMap {
    base_url: Url,
    src: Option<String>,
    imports: SpecifierMap,
    scopes: ScopesMap,
}

/// Serialized shape of an import map
#[derive(Serialize)]
struct Document<'a> {
    imports: &'a SpecifierMap,
    #[serde(skip_serializing_if = "no_scopes")]
    scopes: &'a ScopesMap,
}

fn no_scopes(scopes: &&ScopesMap) -> bool {
    scopes.is_empty()
}

impl ImportMap {
    /// Create a blank import map
    pub fn blank(base_url: Option<&str>) -> Result<Self, ImportMapError> {
        Self::blank_with(&ImportMapOptions::with_base_url(base_url))
    }

    /// Create a blank import map from options
    pub fn blank_with(options: &ImportMapOptions) -> Result<Self, ImportMapError> {
        Ok(Self {
            base_url: resolve_base_url(options.base_url.as_deref())?,
            src: options.src.clone(),
            imports: SpecifierMap::new(),
            scopes: ScopesMap::new(),
        })
    }

    /// Create an import map from an arbitrary JSON value
    ///
    /// Only object-valued `imports` and `scopes` fields are adopted; any other
    /// shape leaves the corresponding table empty.
    pub fn from_value(value: &Value, base_url: Option<&str>) -> Result<Self, ImportMapError> {
        Self::from_value_with(value, &ImportMapOptions::with_base_url(base_url)).map(|(map, _)| map)
    }

    /// Create an import map from a JSON value, returning the entries that were dropped
    pub fn from_value_with(
        value: &Value,
        options: &ImportMapOptions,
    ) -> Result<(Self, SanitizeReport), ImportMapError> {
        let mut map = Self::blank_with(options)?;
        let mut report = SanitizeReport::default();

        if let Value::Object(object) = value {
            if let Some(Value::Object(imports)) = object.get("imports") {
                map.imports = validate_imports(imports, None, &mut report);
            }
            if let Some(Value::Object(scopes)) = object.get("scopes") {
                map.scopes = validate_scopes(scopes, &mut report);
            }
        }

        if !report.is_empty() {
            debug!(dropped = report.len(), "sanitized import map");
            if options.strictness == Strictness::Strict {
                return Err(ImportMapError::InvalidEntries(report));
            }
        }

        Ok((map, report))
    }

    /// Parse an import map from JSON text
    pub fn from_json(json: &str, base_url: Option<&str>) -> Result<Self, ImportMapError> {
        Self::from_json_with(json, &ImportMapOptions::with_base_url(base_url)).map(|(map, _)| map)
    }

    /// Parse an import map from JSON text, returning the entries that were dropped
    pub fn from_json_with(
        json: &str,
        options: &ImportMapOptions,
    ) -> Result<(Self, SanitizeReport), ImportMapError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value_with(&value, options)
    }

    /// Parse the first `<script type="importmap">` block of an HTML document
    ///
    /// Returns a blank map when the document has no such block.
    pub fn from_html(html: &str, base_url: Option<&str>) -> Result<Self, ImportMapError> {
        Self::from_html_with(html, &ImportMapOptions::with_base_url(base_url)).map(|(map, _)| map)
    }

    /// Parse an import map embedded in HTML, returning the entries that were dropped
    pub fn from_html_with(
        html: &str,
        options: &ImportMapOptions,
    ) -> Result<(Self, SanitizeReport), ImportMapError> {
        match html::extract_import_map(html) {
            Some(json) => Self::from_json_with(&json, options),
            None => {
                debug!("no importmap script found in document");
                Ok((Self::blank_with(options)?, SanitizeReport::default()))
            }
        }
    }

    /// Absolute base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Provenance tag, if any
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    /// Set the provenance tag
    pub fn set_src(&mut self, src: Option<String>) {
        self.src = src;
    }

    /// Top-level imports
    pub fn imports(&self) -> &SpecifierMap {
        &self.imports
    }

    /// Scoped imports
    pub fn scopes(&self) -> &ScopesMap {
        &self.scopes
    }

    /// Whether the map has neither imports nor scopes
    pub fn is_blank(&self) -> bool {
        self.imports.is_empty() && self.scopes.is_empty()
    }

    /// Whether two maps resolve identically
    ///
    /// Compares imports and scopes key-for-key and value-for-value. The base
    /// URL and provenance tag are ignored.
    pub fn is_same(&self, other: &ImportMap) -> bool {
        self.imports == other.imports && self.scopes == other.scopes
    }

    /// Map a top-level specifier, returning the previous target
    pub fn insert_import(
        &mut self,
        specifier: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<Option<String>, ImportMapError> {
        let (specifier, target) = checked_entry(specifier.into(), target.into())?;
        Ok(self.imports.insert(specifier, target))
    }

    /// Remove a top-level specifier
    pub fn remove_import(&mut self, specifier: &str) -> Option<String> {
        self.imports.shift_remove(specifier)
    }

    /// Map a specifier inside a scope, creating the scope if needed
    pub fn insert_scoped(
        &mut self,
        scope: impl Into<String>,
        specifier: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<Option<String>, ImportMapError> {
        let (specifier, target) = checked_entry(specifier.into(), target.into())?;
        Ok(self
            .scopes
            .entry(scope.into())
            .or_default()
            .insert(specifier, target))
    }

    /// Remove a specifier from a scope
    ///
    /// The scope itself is kept even if it becomes empty; see
    /// [`ImportMap::prune_empty_scopes`].
    pub fn remove_scoped(&mut self, scope: &str, specifier: &str) -> Option<String> {
        self.scopes.get_mut(scope)?.shift_remove(specifier)
    }

    /// Remove a whole scope
    pub fn remove_scope(&mut self, scope: &str) -> Option<SpecifierMap> {
        self.scopes.shift_remove(scope)
    }

    /// Drop scopes with no entries, returning how many were removed
    pub fn prune_empty_scopes(&mut self) -> usize {
        let before = self.scopes.len();
        self.scopes.retain(|_, imports| !imports.is_empty());
        before - self.scopes.len()
    }

    /// Re-run validation after mutation
    ///
    /// Drops empty targets. Scopes are kept even when they end up empty, which
    /// matches how an empty scope object is treated on parse.
    pub fn validate(&mut self) -> SanitizeReport {
        let mut report = SanitizeReport::default();

        self.imports.retain(|key, target| {
            let keep = !target.is_empty();
            if !keep {
                report.push(None, key, DropReason::EmptyString);
            }
            keep
        });

        for (scope, imports) in &mut self.scopes {
            imports.retain(|key, target| {
                let keep = !target.is_empty();
                if !keep {
                    report.push(Some(scope.as_str()), key, DropReason::EmptyString);
                }
                keep
            });
        }

        report
    }

    /// Serialize as a JSON value (`{"imports": ..., "scopes": ...}`)
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("imports".to_string(), table_to_value(&self.imports));
        if !self.scopes.is_empty() {
            let scopes = self
                .scopes
                .iter()
                .map(|(scope, imports)| (scope.clone(), table_to_value(imports)))
                .collect();
            object.insert("scopes".to_string(), Value::Object(scopes));
        }
        Value::Object(object)
    }

    /// Serialize as compact JSON
    pub fn to_json(&self) -> Result<String, ImportMapError> {
        Ok(serde_json::to_string(&self.document())?)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, ImportMapError> {
        Ok(serde_json::to_string_pretty(&self.document())?)
    }

    fn document(&self) -> Document<'_> {
        Document {
            imports: &self.imports,
            scopes: &self.scopes,
        }
    }
}

/// Resolve an optional base URL against the neutral anchor
fn resolve_base_url(base_url: Option<&str>) -> Result<Url, ImportMapError> {
    let base = base_url.unwrap_or(".");
    let anchor = Url::parse(NEUTRAL_ANCHOR).map_err(|source| ImportMapError::InvalidBaseUrl {
        url: NEUTRAL_ANCHOR.to_string(),
        source,
    })?;
    anchor
        .join(base)
        .map_err(|source| ImportMapError::InvalidBaseUrl {
            url: base.to_string(),
            source,
        })
}

fn checked_entry(specifier: String, target: String) -> Result<(String, String), ImportMapError> {
    if target.is_empty() {
        return Err(ImportMapError::EmptyTarget(specifier));
    }
    Ok((specifier, target))
}

fn validate_imports(
    table: &Map<String, Value>,
    scope: Option<&str>,
    report: &mut SanitizeReport,
) -> SpecifierMap {
    let mut imports = SpecifierMap::new();
    for (key, value) in table {
        match value {
            Value::String(target) if !target.is_empty() => {
                imports.insert(key.clone(), target.clone());
            }
            Value::String(_) => report.push(scope, key, DropReason::EmptyString),
            _ => report.push(scope, key, DropReason::NotAString),
        }
    }
    imports
}

fn validate_scopes(table: &Map<String, Value>, report: &mut SanitizeReport) -> ScopesMap {
    let mut scopes = ScopesMap::new();
    for (scope, value) in table {
        match value {
            Value::Object(imports) => {
                scopes.insert(scope.clone(), validate_imports(imports, Some(scope), report));
            }
            _ => report.push(None, scope, DropReason::NotAnObject),
        }
    }
    scopes
}

fn table_to_value(table: &SpecifierMap) -> Value {
    Value::Object(
        table
            .iter()
            .map(|(key, target)| (key.clone(), Value::String(target.clone())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_defaults_to_file_root() {
        let map = ImportMap::blank(None).unwrap();
        assert_eq!(map.base_url().as_str(), "file:///");
        assert!(map.is_blank());
        assert!(map.src().is_none());
    }

    #[test]
    fn test_relative_base_url_is_resolved() {
        let map = ImportMap::blank(Some("/www/index.html")).unwrap();
        assert_eq!(map.base_url().as_str(), "file:///www/index.html");

        let map = ImportMap::blank(Some("https://example.com/app/")).unwrap();
        assert_eq!(map.base_url().as_str(), "https://example.com/app/");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ImportMap::blank(Some("http://[::1"));
        assert!(matches!(result, Err(ImportMapError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_non_object_fields_are_ignored() {
        let map = ImportMap::from_value(&json!({"imports": ["a"], "scopes": "x"}), None).unwrap();
        assert!(map.is_blank());

        let map = ImportMap::from_value(&json!([1, 2, 3]), None).unwrap();
        assert!(map.is_blank());

        let map = ImportMap::from_value(&Value::Null, None).unwrap();
        assert!(map.is_blank());
    }

    #[test]
    fn test_invalid_imports_are_dropped() {
        let value = json!({
            "imports": {
                "react": "https://esm.sh/react",
                "empty": "",
                "number": 1,
                "null": null,
                "object": {"a": "b"}
            }
        });

        let (map, report) = ImportMap::from_value_with(&value, &ImportMapOptions::default()).unwrap();
        assert_eq!(map.imports().len(), 1);
        assert_eq!(map.imports()["react"], "https://esm.sh/react");
        assert_eq!(report.len(), 4);
        assert!(report.dropped.contains(&DroppedEntry {
            scope: None,
            key: "empty".to_string(),
            reason: DropReason::EmptyString,
        }));
    }

    #[test]
    fn test_invalid_scopes_are_dropped() {
        let value = json!({
            "scopes": {
                "/app/": {"react": "https://esm.sh/react@18", "bad": false},
                "/broken/": "not an object",
                "/list/": []
            }
        });

        let (map, report) = ImportMap::from_value_with(&value, &ImportMapOptions::default()).unwrap();
        assert_eq!(map.scopes().len(), 1);
        assert_eq!(map.scopes()["/app/"].len(), 1);
        assert_eq!(report.len(), 3);
        assert!(report.dropped.contains(&DroppedEntry {
            scope: Some("/app/".to_string()),
            key: "bad".to_string(),
            reason: DropReason::NotAString,
        }));
        assert!(report.dropped.contains(&DroppedEntry {
            scope: None,
            key: "/broken/".to_string(),
            reason: DropReason::NotAnObject,
        }));
    }

    #[test]
    fn test_strict_rejects_invalid_entries() {
        let options = ImportMapOptions::default().strictness(Strictness::Strict);
        let result = ImportMap::from_value_with(&json!({"imports": {"a": 1}}), &options);
        match result {
            Err(ImportMapError::InvalidEntries(report)) => assert_eq!(report.len(), 1),
            other => panic!("Expected InvalidEntries, got {:?}", other),
        }

        let ok = ImportMap::from_value_with(&json!({"imports": {"a": "/a.js"}}), &options);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_empty_scope_is_kept() {
        let map = ImportMap::from_value(&json!({"scopes": {"/app/": {}}}), None).unwrap();
        assert!(!map.is_blank());
        assert!(map.scopes()["/app/"].is_empty());
    }

    #[test]
    fn test_is_same_ignores_base_and_src() {
        let value = json!({"imports": {"a": "/a.js"}, "scopes": {"/x/": {"a": "/xa.js"}}});
        let a = ImportMap::from_value(&value, Some("https://a.example/")).unwrap();
        let mut b = ImportMap::from_value(&value, Some("https://b.example/")).unwrap();
        b.set_src(Some("index.html".to_string()));
        assert!(a.is_same(&b));
        assert!(b.is_same(&a));
    }

    #[test]
    fn test_is_same_detects_extra_scope() {
        let a = ImportMap::from_value(&json!({"scopes": {"/x/": {"a": "/a.js"}}}), None).unwrap();
        let b = ImportMap::from_value(
            &json!({"scopes": {"/x/": {"a": "/a.js"}, "/y/": {"a": "/a.js"}}}),
            None,
        )
        .unwrap();
        assert!(!a.is_same(&b));
        assert!(!b.is_same(&a));
    }

    #[test]
    fn test_insert_rejects_empty_target() {
        let mut map = ImportMap::blank(None).unwrap();
        assert!(matches!(
            map.insert_import("a", ""),
            Err(ImportMapError::EmptyTarget(_))
        ));
        assert!(matches!(
            map.insert_scoped("/x/", "a", ""),
            Err(ImportMapError::EmptyTarget(_))
        ));
        assert!(map.is_blank());
    }

    #[test]
    fn test_scoped_mutation() {
        let mut map = ImportMap::blank(None).unwrap();
        map.insert_scoped("/x/", "a", "/a.js").unwrap();
        assert_eq!(map.remove_scoped("/x/", "a"), Some("/a.js".to_string()));
        assert_eq!(map.scopes().len(), 1);
        assert_eq!(map.prune_empty_scopes(), 1);
        assert!(map.is_blank());
    }

    #[test]
    fn test_to_json_omits_empty_scopes() {
        let mut map = ImportMap::blank(None).unwrap();
        map.insert_import("a", "/a.js").unwrap();
        assert_eq!(map.to_json().unwrap(), r#"{"imports":{"a":"/a.js"}}"#);
        assert_eq!(map.to_value(), json!({"imports": {"a": "/a.js"}}));
    }

    #[test]
    fn test_report_display() {
        let (_, report) = ImportMap::from_value_with(
            &json!({"imports": {"a": 1}, "scopes": {"/s/": 2}}),
            &ImportMapOptions::default(),
        )
        .unwrap();
        let text = report.to_string();
        assert!(text.contains(r#"imports["a"]: value is not a string"#));
        assert!(text.contains(r#"scopes["/s/"]: scope is not an object"#));
    }
}
