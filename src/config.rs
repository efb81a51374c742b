//! `tracker.toml` - optional settings file for the CLI

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "tracker.toml";
pub const DEFAULT_DATABASE_FILE: &str = "tracker.db";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    /// Database file used when `--database` is not given
    pub database: Option<String>,
}

impl TrackerConfig {
    /// Read a config file, `None` when it does not exist
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }

    /// Write the config, refusing to replace an existing file unless `force`
    pub fn save(&self, path: &Path, force: bool) -> anyhow::Result<()> {
        ensure_writable(path, force)?;
        std::fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// Fail early when `path` exists and may not be overwritten
pub fn ensure_writable(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }
    Ok(())
}

/// Pick the database path: explicit flag, then config file, then `tracker.db`
pub fn resolve_database_path(flag: Option<&Path>, config: Option<&TrackerConfig>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| config.and_then(|c| c.database.as_ref()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE))
}
