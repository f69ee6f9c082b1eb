//! Configuration management.

use anyhow::{bail, Context as _, Result};
use kvdns_srv::ServerConfig;
use std::path::{Path, PathBuf};

/// Default config file: `<config dir>/kvdns/kvdns.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kvdns").join("kvdns.toml"))
}

/// Load the server configuration.
///
/// An explicit `path` must exist. Without one, the default location is used
/// when present and built-in defaults otherwise.
pub fn load(path: Option<&Path>, database: Option<PathBuf>) -> Result<ServerConfig> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            ServerConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => match default_path() {
            Some(path) => ServerConfig::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => ServerConfig::default(),
        },
    };

    if let Some(database) = database {
        config.database = database;
    }
    Ok(config)
}
