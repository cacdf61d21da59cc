use std::path::{Path, PathBuf};

use super::types::Config;
use crate::error::{Error, Result};

/// Per-project config file, looked up in the working directory.
pub const LOCAL_CONFIG: &str = ".matomail.toml";

/// User config file, relative to the home directory.
pub const GLOBAL_CONFIG: &str = ".config/matomail/config.toml";

/// Where the config file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A path given on the command line; it must exist.
    Explicit(PathBuf),
    /// Search the usual locations.
    Discover,
    /// Use built-in defaults only.
    Disabled,
}

/// Load the config for `source`.
///
/// Discovery checks, in order:
/// 1. `./.matomail.toml`: project settings
/// 2. `~/.config/matomail/config.toml`: user settings
///
/// The first file found wins; files are not merged. Returns `None` when no
/// file applies.
pub fn load_config(source: &ConfigSource) -> Result<Option<(PathBuf, Config)>> {
    match source {
        ConfigSource::Disabled => Ok(None),
        ConfigSource::Explicit(path) => {
            if !path.exists() {
                return Err(Error::ConfigMissing { path: path.clone() });
            }
            let config = parse_config_file(path)?;
            Ok(Some((path.clone(), config)))
        }
        ConfigSource::Discover => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            discover(&cwd, home_dir().as_deref())
        }
    }
}

fn discover(cwd: &Path, home: Option<&Path>) -> Result<Option<(PathBuf, Config)>> {
    for path in candidates(cwd, home) {
        if !path.exists() {
            continue;
        }
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "config path is not a file, skipping");
            continue;
        }
        let config = parse_config_file(&path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        return Ok(Some((path, config)));
    }
    tracing::debug!("no config file found, using defaults");
    Ok(None)
}

fn candidates(cwd: &Path, home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(LOCAL_CONFIG)];
    if let Some(home) = home {
        paths.push(home.join(GLOBAL_CONFIG));
    }
    paths
}

fn parse_config_file(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Platform-aware home directory lookup.
fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
