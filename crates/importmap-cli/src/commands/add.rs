//! `importmap add`: map a package at a CDN URL.

use std::path::Path;

pub fn execute(package: &str, map_path: &Path, config: Option<&Path>) -> anyhow::Result<()> {
    let generator = super::generator(config)?;
    let map = super::load_editable(map_path)?;

    let updated = generator.add(&map, package)?;
    super::save_map(map_path, &updated)?;

    println!("Added {} to {}", package, map_path.display());
    Ok(())
}
