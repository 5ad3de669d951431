//! Command implementations

pub mod add;
pub mod check;
pub mod remove;
pub mod resolve;
pub mod tidy;
pub mod update;

use anyhow::{bail, Context};
use importmap::{
    html, Generator, GeneratorConfig, HttpRegistry, ImportMap, ImportMapOptions, SanitizeReport,
};
use std::path::Path;
use tracing::{debug, info, warn};

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Read an import map from a JSON or HTML file
pub fn load_map(
    path: &Path,
    options: ImportMapOptions,
) -> anyhow::Result<(ImportMap, SanitizeReport)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let options = options.src(path.display().to_string());

    let parsed = if is_html(path) {
        if !html::has_import_map(&content) {
            warn!(path = %path.display(), "no import map script in document, using a blank map");
        }
        ImportMap::from_html_with(&content, &options)
    } else {
        ImportMap::from_json_with(&content, &options)
    };
    let (map, report) = parsed.with_context(|| format!("Failed to load {}", path.display()))?;

    debug!(path = %path.display(), dropped = report.len(), "loaded import map");
    Ok((map, report))
}

/// Read the map an editing command rewrites, starting blank if the file is missing
pub fn load_editable(path: &Path) -> anyhow::Result<ImportMap> {
    if is_html(path) {
        bail!(
            "{} is an HTML document; editing commands only rewrite JSON import maps",
            path.display()
        );
    }
    if !path.exists() {
        info!(path = %path.display(), "starting a new import map");
        return Ok(ImportMap::blank(None)?);
    }
    let (map, _) = load_map(path, ImportMapOptions::default())?;
    Ok(map)
}

/// Write a map back as pretty JSON
pub fn save_map(path: &Path, map: &ImportMap) -> anyhow::Result<()> {
    let mut json = map.to_json_pretty()?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "saved import map");
    Ok(())
}

/// Build a generator from an optional config file
pub fn generator(config: Option<&Path>) -> anyhow::Result<Generator<HttpRegistry>> {
    let config = match config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    let registry = HttpRegistry::from_config(&config)?;
    Ok(Generator::new(config, registry))
}
