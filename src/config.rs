use anyhow::{Context, Result};
use directories::ProjectDirs;
use gridcalc_engine::engine::EngineConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub engine: EngineConfig,
}

pub(crate) fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("me", "shoryuken", "gridcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

pub(crate) fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

pub(crate) fn load_config_file(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_config(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Resolve the configuration to use.
///
/// An explicit path must load. The default location is optional: a missing
/// file means defaults, a broken one is reported as a warning.
pub(crate) fn load_config(explicit: Option<&Path>, no_config: bool) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    if no_config {
        return Ok(Config::default());
    }
    let Some(path) = default_config_path() else {
        return Ok(Config::default());
    };
    if !path.is_file() {
        return Ok(Config::default());
    }
    match load_config_file(&path) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::warn!("ignoring config: {:#}", e);
            Ok(Config::default())
        }
    }
}
