use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{FinanceError, Result},
    utils::{
        app_data_dir,
        persistence::{ensure_dir, write_atomic},
    },
};

const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const DATA_DIR: &str = "data";
const DEFAULT_LOW_BALANCE_THRESHOLD: i64 = 100;
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;
const DEFAULT_BACKUP_RETENTION: usize = 5;

/// User preferences and engine tuning that survive restarts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the persisted ledger. Defaults to `<base>/data`.
    pub data_root: Option<PathBuf>,
    #[serde(default)]
    pub alerts: AlertSettings,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            data_root: None,
            alerts: AlertSettings::default(),
            backup_retention: Self::default_backup_retention(),
        }
    }
}

impl Config {
    pub fn default_backup_retention() -> usize {
        DEFAULT_BACKUP_RETENTION
    }

    pub fn resolve_data_root(&self, base: &Path) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| base.join(DATA_DIR))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertSettings {
    #[serde(default)]
    pub dedup_policy: AlertDedupPolicy,
    #[serde(default = "AlertSettings::default_low_balance_threshold")]
    pub low_balance_threshold: Decimal,
    #[serde(default = "AlertSettings::default_check_interval_secs")]
    pub check_interval_secs: u64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            dedup_policy: AlertDedupPolicy::default(),
            low_balance_threshold: Self::default_low_balance_threshold(),
            check_interval_secs: Self::default_check_interval_secs(),
        }
    }
}

impl AlertSettings {
    pub fn default_low_balance_threshold() -> Decimal {
        Decimal::from(DEFAULT_LOW_BALANCE_THRESHOLD)
    }

    pub fn default_check_interval_secs() -> u64 {
        DEFAULT_CHECK_INTERVAL_SECS
    }
}

/// Controls whether a repeated alert check appends another alert for a
/// condition that is still true.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum AlertDedupPolicy {
    /// Append on every check while the condition holds.
    #[default]
    Always,
    /// Skip when an unread alert for the same condition already exists.
    UnlessUnread,
    /// Skip when an alert for the same condition was created within `minutes`.
    Cooldown { minutes: u32 },
}

/// Handles persistence of [`Config`] under `<base>/config/config.json`.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    /// Uses `FINANCE_CORE_HOME` or `~/.finance_core` as base directory.
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        let config_root = base.join(CONFIG_DIR);
        ensure_dir(&config_root)?;
        Ok(Self {
            path: config_root.join(CONFIG_FILE),
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let data = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            FinanceError::Config(format!("{}: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_returns_defaults_when_missing() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.alerts.dedup_policy, AlertDedupPolicy::Always);
        assert_eq!(config.alerts.low_balance_threshold, Decimal::from(100));
    }

    #[test]
    fn save_and_reload_preserves_policy() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.alerts.dedup_policy = AlertDedupPolicy::Cooldown { minutes: 30 };
        config.currency = "EUR".into();
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        std::fs::write(
            manager.config_path(),
            r#"{"locale":"pt-BR","currency":"BRL"}"#,
        )
        .unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.locale, "pt-BR");
        assert_eq!(loaded.alerts, AlertSettings::default());
        assert_eq!(loaded.backup_retention, 5);
    }

    #[test]
    fn malformed_file_reports_config_error() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        std::fs::write(manager.config_path(), "{ not json").unwrap();
        assert!(matches!(manager.load(), Err(FinanceError::Config(_))));
    }
}
