use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DB_ENV: &str = "MINDLITE_DB";
pub const CONFIG_ENV: &str = "MINDLITE_CONFIG";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Optional settings read from `config.yml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    /// Loads from `MINDLITE_CONFIG` or the platform config directory.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = match env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => default_config_path()?,
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        if data.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(&data).context("parsing config file")?;
        Ok(config)
    }

    /// `--db` flag, then `MINDLITE_DB`, then `db_path`, then the data directory.
    pub fn resolve_db_path(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = flag {
            return Ok(path);
        }
        if let Some(path) = env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        default_db_path()
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "mindlite").context("locating data directory")
}

fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.yml"))
}

fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("mindlite.db"))
}
