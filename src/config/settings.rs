use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::ViewGranularity;

/// Longest dashboard strip accepted from `config.toml`.
pub const MAX_RECENT_DAYS: usize = 366;

fn default_recent_days() -> usize {
    7
}
fn default_tick_rate_ms() -> u64 {
    1000
}
fn default_color() -> String {
    "#06b6d4".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Calendar granularity shown first in `show` and the detail screen.
    #[serde(default)]
    pub default_view: ViewGranularity,
    /// Length of the per-activity strip on the dashboard and in `list`.
    #[serde(default = "default_recent_days")]
    pub recent_days: usize,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_view: ViewGranularity::default(),
            recent_days: default_recent_days(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_color")]
    pub default_color: String,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub activities: ActivityConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "timetrail")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("timetrail.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let days = self.display.recent_days;
        if !(1..=MAX_RECENT_DAYS).contains(&days) {
            bail!(
                "display.recent_days must be between 1 and {}, got {}",
                MAX_RECENT_DAYS,
                days
            );
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.display.default_view, ViewGranularity::Week);
        assert_eq!(config.display.recent_days, 7);
        assert_eq!(config.activities.default_color, "#06b6d4");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\ndefault_view = \"month\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.display.default_view, ViewGranularity::Month);
        assert_eq!(config.display.tick_rate_ms, 1000);
        assert_eq!(config.activities.default_color, "#06b6d4");
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.display.default_view = ViewGranularity::Year;
        config.activities.default_color = "#f43f5e".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.display.default_view, ViewGranularity::Year);
        assert_eq!(loaded.activities.default_color, "#f43f5e");
    }

    #[test]
    fn rejects_out_of_range_recent_days() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "[display]\nrecent_days = 100000000\n").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("display.recent_days"));

        std::fs::write(&path, "[display]\nrecent_days = 0\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());

        std::fs::write(&path, "[display]\nrecent_days = 366\n").unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap().display.recent_days, 366);
    }

    #[test]
    fn rejects_unknown_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\ndefault_view = \"decade\"\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
