use anyhow::{Context, Result};
use pankki_core::{DEFAULT_ACCOUNT_ID, DEFAULT_CATEGORY_ID};
use pankki_ynab::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::state::{ensure_pankki_home, home_dir};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub watch: WatchSection,
    pub ynab: YnabSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    /// Directory the bank export is downloaded into (default: ~/Downloads)
    pub downloads_dir: Option<PathBuf>,
    /// Working directory holding Config/, RESULTS/ and History/ (default: cwd)
    pub work_dir: Option<PathBuf>,
    pub filename: String,
    pub poll_interval_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YnabSection {
    pub base_url: String,
    pub account_id: String,
    pub default_category_id: String,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            downloads_dir: None,
            work_dir: None,
            filename: "export.csv".to_string(),
            poll_interval_secs: 1.0,
        }
    }
}

impl Default for YnabSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            account_id: DEFAULT_ACCOUNT_ID.to_string(),
            default_category_id: DEFAULT_CATEGORY_ID.to_string(),
        }
    }
}

impl Config {
    pub fn work_dir(&self) -> Result<PathBuf> {
        match &self.watch.work_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("resolve current directory"),
        }
    }

    /// The configured downloads directory, which must exist.
    pub fn downloads_dir(&self) -> Result<PathBuf> {
        let dir = match &self.watch.downloads_dir {
            Some(dir) => dir.clone(),
            None => home_dir()?.join("Downloads"),
        };
        if !dir.is_dir() {
            return Err(ConfigError::DownloadsDir(dir).into());
        }
        Ok(dir)
    }

    /// Where the watched export is moved before processing.
    pub fn work_file(&self) -> Result<PathBuf> {
        Ok(self.work_dir()?.join(&self.watch.filename))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.watch.poll_interval_secs.max(0.1))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_pankki_home()?.join("config.toml"))
}

/// Load `path` (or the default location); a missing file yields defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(Some(&dir.path().join("config.toml"))).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.watch.filename, "export.csv");
        assert_eq!(cfg.ynab.account_id, DEFAULT_ACCOUNT_ID);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[watch]\npoll_interval_secs = 5.0\nwork_dir = \"/srv/pankki\"\n").unwrap();

        let cfg = load_config(Some(&p)).unwrap();
        assert_eq!(cfg.poll_interval(), Duration::from_secs(5));
        assert_eq!(cfg.work_dir().unwrap(), PathBuf::from("/srv/pankki"));
        assert_eq!(cfg.work_file().unwrap(), PathBuf::from("/srv/pankki/export.csv"));
        assert_eq!(cfg.ynab.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.ynab.default_category_id = "fallback".to_string();
        save_config(&p, &cfg).unwrap();
        assert_eq!(load_config(Some(&p)).unwrap(), cfg);
    }

    #[test]
    fn test_missing_downloads_dir_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.watch.downloads_dir = Some(dir.path().join("nope"));
        let err = cfg.downloads_dir().unwrap_err();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::DownloadsDir(_))));
    }
}
