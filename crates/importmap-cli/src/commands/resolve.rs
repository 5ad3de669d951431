//! `importmap resolve`: resolve a specifier against a map.

use importmap::{ImportMapOptions, Resolver, ScopeOrder};
use std::path::Path;

/// Exit code when no entry maps the specifier
const EXIT_UNMAPPED: i32 = 2;

pub fn execute(
    specifier: &str,
    map_path: &Path,
    from: &str,
    base: Option<&str>,
    longest_scope: bool,
) -> anyhow::Result<()> {
    let (map, _) = super::load_map(map_path, ImportMapOptions::with_base_url(base))?;

    let scope_order = if longest_scope {
        ScopeOrder::PathLength
    } else {
        ScopeOrder::SegmentCount
    };
    let resolution = Resolver::new(&map)
        .with_scope_order(scope_order)
        .resolve(specifier, from);

    println!("{}", resolution.url);
    if !resolution.matched {
        eprintln!("'{}' is not mapped", specifier);
        std::process::exit(EXIT_UNMAPPED);
    }
    Ok(())
}
