use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::Config;

/// Environment variable that relocates the sourced home directory.
const HOME_ENV: &str = "SOURCED_DIR";
const CONFIG_FILE: &str = "config.yml";

/// The sourced home: `$SOURCED_DIR`, or `~/.sourced`.
pub fn home_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("could not determine the user home directory")?;
    Ok(home.join(".sourced"))
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}

/// Load config from `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}
