//! Import Maps Library
//!
//! This crate implements the WICG import maps model
//! (<https://wicg.github.io/import-maps/>), including:
//! - Import map construction from JSON values, JSON text and HTML documents
//! - Validation that drops (and reports) malformed entries
//! - Specifier resolution with scopes and prefix matching
//! - Structural comparison of import maps
//! - A generator that adds, updates, removes and tidies CDN package mappings

pub mod config;
pub mod generator;
pub mod host;
pub mod html;
pub mod map;
pub mod registry;
pub mod resolver;

pub use config::{ConfigError, GeneratorConfig};
pub use generator::{Generator, GeneratorError, PackageSpecifier};
pub use host::{supports_import_maps, ImportMapHost, NativeHost, StaticHost};
pub use map::{
    DropReason, DroppedEntry, ImportMap, ImportMapError, ImportMapOptions, SanitizeReport,
    ScopesMap, SpecifierMap, Strictness,
};
pub use registry::{HttpRegistry, MemoryRegistry, PackageRegistry, PackageVersions, RegistryError};
pub use resolver::{resolve, Resolution, Resolver, ScopeOrder};
