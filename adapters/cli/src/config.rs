//! TOML loading for balloon settings and custom balloon registries.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use balloon_defence_core::{BalloonRegistry, BalloonSettings, BalloonType, BalloonTypeId};
use serde::Deserialize;

/// Loads balloon settings, falling back to defaults when no path is given.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<BalloonSettings> {
    let Some(path) = path else {
        return Ok(BalloonSettings::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read balloon settings at {}", path.display()))?;
    parse_settings(&contents)
        .with_context(|| format!("invalid balloon settings in {}", path.display()))
}

/// Loads a balloon registry, falling back to the classic tiers when no path is given.
pub(crate) fn load_registry(path: Option<&Path>) -> Result<BalloonRegistry> {
    let Some(path) = path else {
        return Ok(BalloonRegistry::classic());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read balloon registry at {}", path.display()))?;
    parse_registry(&contents)
        .with_context(|| format!("invalid balloon registry in {}", path.display()))
}

fn parse_settings(contents: &str) -> Result<BalloonSettings> {
    toml::from_str(contents).context("failed to parse balloon settings toml contents")
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    fallback: BalloonTypeId,
    types: Vec<BalloonType>,
}

fn parse_registry(contents: &str) -> Result<BalloonRegistry> {
    let file: RegistryFile =
        toml::from_str(contents).context("failed to parse balloon registry toml contents")?;
    let registry = BalloonRegistry::new(file.types, file.fallback)?;
    Ok(registry)
}
