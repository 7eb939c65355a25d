use anyhow::{ensure, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

fn default_timetable() -> String {
    "data/table.json".to_string()
}
fn default_cities() -> String {
    "data/offset.json".to_string()
}
fn default_body() -> String {
    "Namazi Hund Waqt Wot".to_string()
}
fn default_window_secs() -> u64 {
    3
}
fn default_schedule_interval_secs() -> u64 {
    60
}
fn default_tick_ms() -> u64 {
    1000
}

/// Upper bound for `notifications.window_secs`, one day
const MAX_WINDOW_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// URL or path of the reference timetable
    #[serde(default = "default_timetable")]
    pub timetable: String,
    /// URL or path of the city offset registry
    #[serde(default = "default_cities")]
    pub cities: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            timetable: default_timetable(),
            cities: default_cities(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyBackend {
    #[default]
    Desktop,
    Terminal,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub backend: NotifyBackend,
    #[serde(default = "default_body")]
    pub body: String,
    /// How far ahead of now a prayer may be and still fire
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_schedule_interval_secs")]
    pub schedule_interval_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            backend: NotifyBackend::default(),
            body: default_body(),
            window_secs: default_window_secs(),
            schedule_interval_secs: default_schedule_interval_secs(),
        }
    }
}

impl NotificationConfig {
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs.min(MAX_WINDOW_SECS) as i64)
    }

    pub fn schedule_interval(&self) -> Duration {
        Duration::from_secs(self.schedule_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Clock and countdown refresh
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl DisplayConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "namazkar")
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
        Ok(Self::data_dir()?.join("namazkar.db"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Parsing config.toml")?;
        ensure!(
            config.notifications.window_secs <= MAX_WINDOW_SECS,
            "notifications.window_secs must be at most {} (got {})",
            MAX_WINDOW_SECS,
            config.notifications.window_secs
        );
        Ok(config)
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
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.data.timetable, "data/table.json");
        assert_eq!(config.data.cities, "data/offset.json");
        assert_eq!(config.notifications.backend, NotifyBackend::Desktop);
        assert_eq!(config.notifications.window_secs, 3);
        assert_eq!(config.notifications.schedule_interval(), Duration::from_secs(60));
        assert_eq!(config.display.tick_ms, 1000);
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::parse(
            r#"
            [data]
            timetable = "https://example.org/data/table.json"

            [notifications]
            backend = "terminal"
            body = "Time to pray"
            "#,
        )
        .unwrap();
        assert_eq!(config.data.timetable, "https://example.org/data/table.json");
        assert_eq!(config.data.cities, "data/offset.json");
        assert_eq!(config.notifications.backend, NotifyBackend::Terminal);
        assert_eq!(config.notifications.body, "Time to pray");
        assert_eq!(config.notifications.window(), chrono::Duration::seconds(3));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(AppConfig::parse("[notifications]\nbackend = \"pigeon\"").is_err());
    }

    #[test]
    fn test_oversized_window_rejected() {
        let err = AppConfig::parse("[notifications]\nwindow_secs = 100000000000000000")
            .unwrap_err();
        assert!(err.to_string().contains("window_secs"));

        let config = AppConfig::parse("[notifications]\nwindow_secs = 86400").unwrap();
        assert_eq!(config.notifications.window(), chrono::Duration::days(1));
    }

    #[test]
    fn test_window_clamped_when_built_directly() {
        let notifications = NotificationConfig {
            window_secs: u64::MAX,
            ..NotificationConfig::default()
        };
        assert_eq!(notifications.window(), chrono::Duration::days(1));
    }

    #[test]
    fn test_zero_tick_clamped() {
        let config = AppConfig::parse("[display]\ntick_ms = 0").unwrap();
        assert_eq!(config.display.tick_rate(), Duration::from_millis(1));
        assert_eq!(DisplayConfig::default().tick_rate(), Duration::from_secs(1));
    }
}
