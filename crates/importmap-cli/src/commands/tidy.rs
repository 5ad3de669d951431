//! `importmap tidy`: drop redundant scoped entries and empty scopes.

use std::path::Path;

pub fn execute(map_path: &Path, config: Option<&Path>) -> anyhow::Result<()> {
    let generator = super::generator(config)?;
    let map = super::load_editable(map_path)?;

    let tidied = generator.tidy(&map)?;
    let changed = !tidied.is_same(&map);
    super::save_map(map_path, &tidied)?;

    if changed {
        println!("Tidied {}", map_path.display());
    } else {
        println!("{} is already tidy", map_path.display());
    }
    Ok(())
}
