//! `importmap remove`: drop a package from the imports and every scope.

use std::path::Path;

pub fn execute(package: &str, map_path: &Path, config: Option<&Path>) -> anyhow::Result<()> {
    let generator = super::generator(config)?;
    let map = super::load_editable(map_path)?;

    let updated = generator.remove(&map, package)?;
    super::save_map(map_path, &updated)?;

    println!("Removed {} from {}", package, map_path.display());
    Ok(())
}
