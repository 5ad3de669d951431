//! `importmap check`: validate a map and list what would be dropped.

use importmap::{ImportMapOptions, Strictness};
use std::path::Path;

pub fn execute(path: &Path, strict: bool) -> anyhow::Result<()> {
    let mut options = ImportMapOptions::default();
    if strict {
        options = options.strictness(Strictness::Strict);
    }
    let (map, report) = super::load_map(path, options)?;

    for entry in &report.dropped {
        println!("dropped {}", entry);
    }

    let scoped: usize = map.scopes().values().map(|imports| imports.len()).sum();
    println!(
        "{}: {} imports, {} scopes ({} scoped entries), {} dropped",
        path.display(),
        map.imports().len(),
        map.scopes().len(),
        scoped,
        report.len()
    );
    Ok(())
}
