//! Configuration loading and validation for the demo terminal.
//!
//! Uses serde_yaml to load YAML configuration files, with an environment
//! variable override for the storage location.

mod account;
mod app;
mod duration;
mod error;
mod simulator;
mod storage;

pub use account::AccountConfig;
pub use app::AppConfig;
pub use error::ConfigError;
pub use simulator::SimulatorConfig;
pub use storage::StorageConfig;

use rust_decimal::Decimal;
use serde::Deserialize;
use std::{env, fs};

/// Environment variable overriding `storage.path`.
pub const STORAGE_PATH_ENV: &str = "PAPER_TERMINAL_DB";

/// Root configuration structure for the demo terminal.
///
/// Required sections: app.
/// Optional sections: simulator, account, storage.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application-level settings like name and environment.
    pub app: AppConfig,
    /// Price feed cadence and seeding (optional).
    #[serde(default)]
    pub simulator: SimulatorConfig,
    /// Demo account balance and risk limits (optional).
    #[serde(default)]
    pub account: AccountConfig,
    /// Local persistence of the account (optional).
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Loads `.env` first (if present) so that `PAPER_TERMINAL_DB` can be set there.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Configuration used when no file is given: every section at its default,
    /// with the storage path still taken from the environment when set.
    pub fn with_defaults(name: &str) -> Self {
        let mut cfg = Self {
            app: AppConfig {
                name: name.to_string(),
                env: "development".to_string(),
                log_level: None,
            },
            simulator: SimulatorConfig::default(),
            account: AccountConfig::default(),
            storage: StorageConfig::default(),
        };
        cfg.apply_env_overrides();
        cfg
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var(STORAGE_PATH_ENV) {
            if !path.is_empty() {
                self.storage.path = path;
            }
        }
    }

    /// Validate the configuration.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.is_empty() {
            return Err(ConfigError::Validation("app.name is required".into()));
        }

        if self.simulator.tick_interval.is_zero() {
            return Err(ConfigError::Validation(
                "simulator.tick_interval must be positive".into(),
            ));
        }

        if self.simulator.summary_interval.is_zero() {
            return Err(ConfigError::Validation(
                "simulator.summary_interval must be positive".into(),
            ));
        }

        if self.account.initial_balance <= Decimal::ZERO {
            return Err(ConfigError::Validation(
                "account.initial_balance must be positive".into(),
            ));
        }

        let max_risk = self.account.max_risk_percent;
        if max_risk <= Decimal::ZERO || max_risk > Decimal::ONE_HUNDRED {
            return Err(ConfigError::Validation(format!(
                "account.max_risk_percent must be in (0, 100], got {}",
                max_risk
            )));
        }

        if self.storage.enabled && self.storage.path.is_empty() {
            return Err(ConfigError::Validation(
                "storage.path is required when storage is enabled".into(),
            ));
        }

        if self.storage.namespace.is_empty() {
            return Err(ConfigError::Validation(
                "storage.namespace must not be empty".into(),
            ));
        }

        Ok(())
    }
}
