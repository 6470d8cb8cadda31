// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// a checked [`ConfigFile`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the config for a CLI invocation.
///
/// - An explicit `--config` path must exist and be valid.
/// - Otherwise [`default_config_path`] is used if it exists.
/// - With neither, the built-in defaults apply.
pub fn load_for_cli(explicit: Option<&str>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        debug!(path, "loading config from --config");
        return load_and_validate(path);
    }

    let path = default_config_path();
    if path.is_file() {
        debug!(path = %path.display(), "loading default config file");
        return load_and_validate(&path);
    }

    Ok(ConfigFile::default())
}

/// Default config location: `Concurrently.toml` in the current directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Concurrently.toml")
}
