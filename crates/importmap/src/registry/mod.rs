//! Package registry access
//!
//! The generator asks a [`PackageRegistry`] which versions of a package
//! exist. [`HttpRegistry`] talks to an npm-compatible registry over HTTP;
//! [`MemoryRegistry`] serves a fixed set of packages.

mod api;
mod client;
mod memory;

pub use api::{PackageVersions, Packument};
pub use client::{HttpRegistry, RegistryError};
pub use memory::MemoryRegistry;

/// Source of package version information
pub trait PackageRegistry {
    /// Published versions and dist-tags of a package
    fn versions(&self, name: &str) -> Result<PackageVersions, RegistryError>;
}

impl<R: PackageRegistry + ?Sized> PackageRegistry for &R {
    fn versions(&self, name: &str) -> Result<PackageVersions, RegistryError> {
        (**self).versions(name)
    }
}

impl<R: PackageRegistry + ?Sized> PackageRegistry for Box<R> {
    fn versions(&self, name: &str) -> Result<PackageVersions, RegistryError> {
        (**self).versions(name)
    }
}
