//! Watchdog configuration file.
//!
//! Loads settings from `~/.mik/logrotate.toml`. The `[rotation]` table is the
//! flat host settings map handed to [`super::parse`]; the other tables select
//! the inventory and supervisor backends.
//!
//! # Example Configuration
//!
//! ```toml
//! [rotation]
//! max_size = "10MB"
//! interval_unit = "day"
//! interval = 1
//! retain = 7
//! date_mode = "system"
//! date_format = "YYYY-MM-DD_HH-mm-ss"
//! rotation_strategy = "copytruncate"
//!
//! [inventory]
//! source = "static"
//!
//! [[inventory.apps]]
//! name = "api"
//! out_log = "/var/log/api/out.log"
//! err_log = "/var/log/api/err.log"
//!
//! [supervisor]
//! control = "none"
//!
//! [worker]
//! interval_secs = 50
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_WORKER_INTERVAL_SECS, SUPERVISOR_DIR_NAME,
};
use crate::inventory::ProcessLogs;

/// Watchdog configuration loaded from `~/.mik/logrotate.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Raw rotation settings; validated later by `config::parse`.
    pub rotation: BTreeMap<String, toml::Value>,
    /// Where monitored processes come from.
    pub inventory: InventorySettings,
    /// How the supervisor is reached.
    pub supervisor: SupervisorSettings,
    /// Polling loop settings.
    pub worker: WorkerSettings,
}

/// Process inventory backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventorySource {
    /// Ask the pm2 CLI (`pm2 jlist`).
    #[default]
    Pm2,
    /// Use the `[[inventory.apps]]` list from this file.
    Static,
}

/// Inventory settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InventorySettings {
    pub source: InventorySource,
    /// Applications for the static source.
    pub apps: Vec<ProcessLogs>,
}

/// Supervisor control backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    /// Run `pm2 reloadLogs`.
    #[default]
    Pm2,
    /// Send `SIGUSR2` to `pid`.
    Signal,
    /// Do nothing.
    None,
}

/// Supervisor settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SupervisorSettings {
    pub control: ControlKind,
    /// Target pid for the signal backend.
    pub pid: Option<i32>,
    /// Supervisor home holding its own logs (default `~/.pm2`).
    pub home: Option<PathBuf>,
}

/// Polling loop settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Tick period in seconds.
    pub interval_secs: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_WORKER_INTERVAL_SECS,
        }
    }
}

impl WatchdogConfig {
    /// Load configuration from `path`, or from `~/.mik/logrotate.toml`.
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid, returns an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            tracing::debug!(
                path = %config_path.display(),
                "Watchdog config not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path).with_context(|| {
            format!(
                "Failed to read watchdog config from {}",
                config_path.display()
            )
        })?;

        let config = Self::from_toml(&content).with_context(|| {
            format!(
                "Failed to parse watchdog config from {}",
                config_path.display()
            )
        })?;

        tracing::info!(
            path = %config_path.display(),
            settings = config.rotation.len(),
            inventory = ?config.inventory.source,
            control = ?config.supervisor.control,
            "Loaded watchdog configuration"
        );

        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.worker.interval_secs == 0 {
            anyhow::bail!("worker.interval_secs must be positive");
        }
        Ok(config)
    }

    /// Get the path to the watchdog configuration file.
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Flattens `[rotation]` into the string map the policy parser expects.
    ///
    /// Scalars are stringified; tables and arrays are skipped with a warning.
    pub fn rotation_settings(&self) -> HashMap<String, String> {
        let mut settings = HashMap::with_capacity(self.rotation.len());
        for (key, value) in &self.rotation {
            let text = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    tracing::warn!(
                        key = %key,
                        kind = other.type_str(),
                        "Ignoring non-scalar rotation setting"
                    );
                    continue;
                },
            };
            settings.insert(key.clone(), text);
        }
        settings
    }

    /// Supervisor home directory, defaulting to `~/.pm2`.
    pub fn supervisor_home(&self) -> Result<PathBuf> {
        if let Some(home) = &self.supervisor.home {
            return Ok(home.clone());
        }
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(SUPERVISOR_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatchdogConfig::default();
        assert!(config.rotation.is_empty());
        assert_eq!(config.inventory.source, InventorySource::Pm2);
        assert_eq!(config.supervisor.control, ControlKind::Pm2);
        assert_eq!(config.worker.interval_secs, 50);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[rotation]
max_size = "1MB"
interval = 2
retain = 5

[inventory]
source = "static"

[[inventory.apps]]
name = "api"
out_log = "/var/log/api/out.log"
err_log = "/var/log/api/err.log"

[supervisor]
control = "signal"
pid = 4242
home = "/opt/pm2"

[worker]
interval_secs = 10
"#;
        let config = WatchdogConfig::from_toml(toml).unwrap();
        let settings = config.rotation_settings();
        assert_eq!(settings["max_size"], "1MB");
        assert_eq!(settings["interval"], "2");
        assert_eq!(settings["retain"], "5");

        assert_eq!(config.inventory.source, InventorySource::Static);
        assert_eq!(config.inventory.apps.len(), 1);
        assert_eq!(config.inventory.apps[0].name, "api");
        assert!(config.inventory.apps[0].combined_log.is_none());

        assert_eq!(config.supervisor.control, ControlKind::Signal);
        assert_eq!(config.supervisor.pid, Some(4242));
        assert_eq!(
            config.supervisor_home().unwrap(),
            PathBuf::from("/opt/pm2")
        );
        assert_eq!(config.worker.interval_secs, 10);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = WatchdogConfig::from_toml("").unwrap();
        assert!(config.rotation_settings().is_empty());
        assert_eq!(config.worker.interval_secs, 50);
    }

    #[test]
    fn test_non_scalar_settings_are_skipped() {
        let toml = r#"
[rotation]
retain = "none"
date_format = ["YYYY"]
"#;
        let config = WatchdogConfig::from_toml(toml).unwrap();
        let settings = config.rotation_settings();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings["retain"], "none");
    }

    #[test]
    fn test_zero_worker_interval_rejected() {
        assert!(WatchdogConfig::from_toml("[worker]\ninterval_secs = 0\n").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = WatchdogConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.inventory.source, InventorySource::Pm2);
    }

    #[test]
    fn test_config_path() {
        let path = WatchdogConfig::config_path().unwrap();
        assert!(path.ends_with("logrotate.toml"));
        assert!(path.to_string_lossy().contains(".mik"));
    }
}
