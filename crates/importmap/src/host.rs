//! Host capability checks

/// A module loader that may or may not honor import maps
pub trait ImportMapHost {
    /// Whether the host resolves imports through an import map
    fn supports_import_maps(&self) -> bool;
}

/// The resolver in this crate, which always applies import maps
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeHost;

impl ImportMapHost for NativeHost {
    fn supports_import_maps(&self) -> bool {
        true
    }
}

/// A host with a fixed, externally known capability
#[derive(Debug, Clone, Copy)]
pub struct StaticHost(pub bool);

impl ImportMapHost for StaticHost {
    fn supports_import_maps(&self) -> bool {
        self.0
    }
}

/// Whether import maps are supported by the native host
pub fn supports_import_maps() -> bool {
    NativeHost.supports_import_maps()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_host_supports_import_maps() {
        assert!(supports_import_maps());
    }

    #[test]
    fn test_static_host() {
        let hosts: [&dyn ImportMapHost; 2] = [&StaticHost(true), &StaticHost(false)];
        let supported: Vec<bool> = hosts.iter().map(|h| h.supports_import_maps()).collect();
        assert_eq!(supported, vec![true, false]);
    }
}
