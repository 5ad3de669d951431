//! Generator configuration
//!
//! Loaded from a TOML file such as:
//!
//! ```toml
//! cdn-origin = "https://esm.sh"
//! registry-url = "https://registry.npmjs.org"
//! timeout-secs = 30
//! ```
//!
//! Every field is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Default CDN that package URLs point at
pub const DEFAULT_CDN_ORIGIN: &str = "https://esm.sh";

/// Default npm-compatible registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A URL field is not an absolute http(s) URL
    #[error("Invalid {field}: '{value}'")]
    InvalidUrl { field: &'static str, value: String },
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    /// Origin prefixed to package URLs (path and query are discarded)
    pub cdn_origin: String,

    /// Package registry queried for versions
    pub registry_url: String,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cdn_origin: DEFAULT_CDN_ORIGIN.to_string(),
            registry_url: DEFAULT_REGISTRY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = toml::from_str(content)?;
        config.validated()
    }

    /// Replace the CDN origin
    pub fn with_cdn_origin(mut self, origin: &str) -> Result<Self, ConfigError> {
        self.cdn_origin = origin.to_string();
        self.validated()
    }

    /// Replace the registry URL
    pub fn with_registry_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.registry_url = url.to_string();
        self.validated()
    }

    /// Check URL fields and normalize the CDN origin
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let cdn = parse_http_url("cdn-origin", &self.cdn_origin)?;
        self.cdn_origin = cdn.origin().ascii_serialization();

        parse_http_url("registry-url", &self.registry_url)?;
        self.registry_url = self.registry_url.trim_end_matches('/').to_string();

        Ok(self)
    }
}

fn parse_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(invalid()),
    }
}
