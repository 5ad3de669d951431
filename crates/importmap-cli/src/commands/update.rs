//! `importmap update`: move a mapped package to another version.

use std::path::Path;

pub fn execute(
    package: &str,
    version: &str,
    map_path: &Path,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let generator = super::generator(config)?;
    let map = super::load_editable(map_path)?;

    let updated = generator.update(&map, package, version)?;
    super::save_map(map_path, &updated)?;

    if let Some(url) = updated.imports().get(package) {
        println!("Updated {} -> {}", package, url);
    }
    Ok(())
}
