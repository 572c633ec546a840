use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "kick-counter";
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the database location.
pub const DB_ENV: &str = "KICK_COUNTER_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KickConfig {
    /// Where the session database lives. Defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Ring the terminal bell on every counted kick.
    pub haptics: bool,
}

impl Default for KickConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            haptics: true,
        }
    }
}

impl KickConfig {
    /// Load configuration from the user's config directory.
    ///
    /// Falls back to defaults when the file can't be read or parsed and hands
    /// the failure back, since tracing may not be initialised yet.
    pub fn load_or_default() -> (Self, Option<anyhow::Error>) {
        match get_config_path() {
            Ok(path) => Self::load_from_or_default(&path),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn load_from_or_default(path: &Path) -> (Self, Option<anyhow::Error>) {
        match Self::load_from(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Database location with precedence: explicit flag, `KICK_COUNTER_DB`,
    /// config file, then the platform default.
    pub fn resolve_database_path(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        let from_env = std::env::var_os(DB_ENV).map(PathBuf::from);
        match flag.or(from_env).or_else(|| self.database_path.clone()) {
            Some(path) => Ok(path),
            None => crate::db::default_path(),
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
