//! Configuration file support for coach.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/coach/config.toml`.

use crate::stats::{
    StatsWindow, DEFAULT_MAX_LOOKBACK_DAYS, DEFAULT_TARGET_PER_WEEK, DEFAULT_WINDOW_DAYS,
    MAX_WINDOW_DAYS,
};
use crate::{Error, Result, TraineeId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub trainee: TraineeConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub timer: TimerConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Who is training when no `--trainee` is given
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraineeConfig {
    #[serde(default = "default_trainee_id")]
    pub id: String,
}

impl Default for TraineeConfig {
    fn default() -> Self {
        Self {
            id: default_trainee_id(),
        }
    }
}

/// Statistics window parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    #[serde(default = "default_target_per_week")]
    pub target_per_week: u32,

    #[serde(default = "default_max_lookback_days")]
    pub max_lookback_days: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            target_per_week: default_target_per_week(),
            max_lookback_days: default_max_lookback_days(),
        }
    }
}

/// Rest timer tick period
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("coach")
}

fn default_trainee_id() -> String {
    "me".into()
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_target_per_week() -> u32 {
    DEFAULT_TARGET_PER_WEEK
}

fn default_max_lookback_days() -> u32 {
    DEFAULT_MAX_LOOKBACK_DAYS
}

fn default_tick_millis() -> u64 {
    1000
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("coach").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.trainee.id.trim().is_empty() {
            return Err(Error::Config("trainee.id must not be empty".into()));
        }
        if self.timer.tick_millis == 0 {
            return Err(Error::Config("timer.tick_millis must be positive".into()));
        }
        for (key, days) in [
            ("stats.window_days", self.stats.window_days),
            ("stats.max_lookback_days", self.stats.max_lookback_days),
        ] {
            if days > MAX_WINDOW_DAYS {
                return Err(Error::Config(format!(
                    "{} must be at most {}, got {}",
                    key, MAX_WINDOW_DAYS, days
                )));
            }
        }
        Ok(())
    }

    pub fn trainee_id(&self) -> TraineeId {
        TraineeId::new(self.trainee.id.trim())
    }

    pub fn stats_window(&self) -> StatsWindow {
        StatsWindow {
            window_days: self.stats.window_days,
            target_per_week: self.stats.target_per_week,
            max_lookback_days: self.stats.max_lookback_days,
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.timer.tick_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.stats.window_days, 30);
        assert_eq!(config.stats.target_per_week, 3);
        assert_eq!(config.stats.max_lookback_days, 30);
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.trainee_id().as_str(), "me");
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.trainee.id = "ana".into();
        config.stats.target_per_week = 4;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.trainee.id, "ana");
        assert_eq!(loaded.stats.target_per_week, 4);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[stats]
window_days = 14
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.stats.window_days, 14);
        assert_eq!(config.stats.target_per_week, 3); // default
        assert_eq!(config.timer.tick_millis, 1000); // default
    }

    #[test]
    fn test_zero_tick_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\ntick_millis = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_oversized_stats_windows_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        std::fs::write(&path, "[stats]\nwindow_days = 200000000\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));

        std::fs::write(&path, "[stats]\nmax_lookback_days = 200000000\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));

        std::fs::write(&path, "[stats]\nwindow_days = 365\nmax_lookback_days = 365\n").unwrap();
        assert!(Config::load_from(&path).is_ok());
    }
}
