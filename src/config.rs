// Configuration - layered loading using figment
//
// Sources (in priority order, highest wins):
// 1. Environment variables (`SAVEALARM_*` prefix, `__` as separator)
// 2. Working-directory `save-alarm.toml`
// 3. User-level `~/.config/save-alarm/config.toml`
// 4. Built-in defaults
//
// `SAVEALARM_SOURCE_COLORS__BINANCE=yellow` maps to `source_colors.binance`.

use crate::aggregator::DEFAULT_PROGRESS_CEILING;
use crate::entities::{Amount, Source};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

const APP_DIR: &str = "save-alarm";
const LOCAL_CONFIG_FILE: &str = "save-alarm.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

const fn default_ceiling() -> Amount {
    DEFAULT_PROGRESS_CEILING
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// SQLite file holding the entries (default: `<data_dir>/save-alarm/entries.db`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Log file (default: `<data_dir>/save-alarm/save-alarm.log`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// `tracing` filter used when `SAVEALARM_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Total that fills the progress circle
    #[serde(default = "default_ceiling")]
    pub progress_ceiling: Amount,

    /// Per-source color overrides
    #[serde(default)]
    pub source_colors: BTreeMap<Source, String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_file: None,
            log_filter: default_log_filter(),
            progress_ceiling: default_ceiling(),
            source_colors: BTreeMap::new(),
        }
    }
}

impl TrackerConfig {
    /// Load from all sources and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Working-directory config
        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("SAVEALARM_").split("__").ignore(&["log"]))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_ceiling == 0 {
            return Err(ConfigError::InvalidValue {
                field: "progress_ceiling".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_filter".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("entries.db"))
    }

    pub fn resolved_log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("save-alarm.log"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
    }

    fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn default_config_is_valid() {
        let config = TrackerConfig::default();
        assert_eq!(config.progress_ceiling, 10_000);
        assert_eq!(config.log_filter, "info");
        assert!(config.source_colors.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_ceiling_is_rejected() {
        let config = TrackerConfig {
            progress_ceiling: 0,
            ..TrackerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "progress_ceiling"
        ));
    }

    #[test]
    fn explicit_paths_win_over_data_dir() {
        let config = TrackerConfig {
            database_path: Some(PathBuf::from("/tmp/savings.db")),
            ..TrackerConfig::default()
        };
        assert_eq!(config.resolved_database_path(), PathBuf::from("/tmp/savings.db"));
        assert!(config.resolved_log_file().ends_with("save-alarm/save-alarm.log"));
    }

    #[test]
    fn local_file_and_env_layer_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
                progress_ceiling = 5000
                database_path = "local.db"

                [source_colors]
                binance = "yellow"
                "#,
            )?;
            jail.set_env("SAVEALARM_PROGRESS_CEILING", "20000");
            jail.set_env("SAVEALARM_LOG", "trace");

            let config = TrackerConfig::load().expect("config should load");
            assert_eq!(config.progress_ceiling, 20_000);
            assert_eq!(config.database_path, Some(PathBuf::from("local.db")));
            assert_eq!(config.source_colors.get(&Source::Binance).map(String::as_str), Some("yellow"));
            assert_eq!(config.log_filter, "info");
            Ok(())
        });
    }

    #[test]
    fn unknown_source_key_fails_to_load() {
        Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
                [source_colors]
                piggy_bank = "pink"
                "#,
            )?;

            assert!(matches!(TrackerConfig::load(), Err(ConfigError::Figment(_))));
            Ok(())
        });
    }
}
