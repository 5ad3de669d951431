//! Registry HTTP client
//!
//! Provides a blocking HTTP client for npm-compatible package registries.

use super::api::{PackageVersions, Packument};
use super::PackageRegistry;
use crate::config::GeneratorConfig;
use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Package not found
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// Registry unavailable
    #[error("Registry unavailable: {0}")]
    Unavailable(String),
}

/// Registry client for an npm-compatible registry
#[derive(Debug)]
pub struct HttpRegistry {
    /// HTTP client
    client: Client,

    /// Base URL for the registry
    base_url: String,
}

impl HttpRegistry {
    /// Create a registry client for `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("importmap/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a registry client from generator configuration
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, RegistryError> {
        Self::new(&config.registry_url, Duration::from_secs(config.timeout_secs))
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the package document
    ///
    /// GET /{name}
    pub fn get_packument(&self, name: &str) -> Result<Packument, RegistryError> {
        let url = format!("{}/{}", self.base_url, encode_package_name(name));
        debug!(%url, "fetching package document");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::PackageNotFound(name.to_string()));
        }

        if !response.status().is_success() {
            return Err(RegistryError::Unavailable(format!(
                "Registry returned status {}",
                response.status()
            )));
        }

        let packument: Packument = response.json()?;
        Ok(packument)
    }
}

impl PackageRegistry for HttpRegistry {
    fn versions(&self, name: &str) -> Result<PackageVersions, RegistryError> {
        self.get_packument(name).map(PackageVersions::from)
    }
}

/// Encode a package name for URL path
///
/// Handles scoped packages (@org/name) by encoding the /
fn encode_package_name(name: &str) -> String {
    if name.starts_with('@') {
        // Scoped package: @org/name -> @org%2Fname
        name.replacen('/', "%2F", 1)
    } else {
        name.to_string()
    }
}
