//! Terminal configuration.

use rust_decimal::Decimal;
use std::time::Duration;

use crate::account::DEFAULT_INITIAL_BALANCE;
use crate::book::PlacementLimits;
use crate::config::Config;

/// Terminal configuration options.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Balance a new or reset account starts with.
    pub initial_balance: Decimal,
    /// Limits applied to every order placement.
    pub limits: PlacementLimits,
    /// Interval between account summary log lines.
    pub summary_interval: Duration,
}

impl TerminalConfig {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            initial_balance: cfg.account.initial_balance,
            limits: PlacementLimits {
                max_risk_percent: cfg.account.max_risk_percent,
            },
            summary_interval: cfg.simulator.summary_interval,
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            limits: PlacementLimits::default(),
            summary_interval: Duration::from_secs(30),
        }
    }
}
