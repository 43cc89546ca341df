//! Demo account configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::account::DEFAULT_INITIAL_BALANCE;

/// Demo account settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Balance a new or reset account starts with (default: 10000).
    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,
    /// Maximum risk per trade in percent of balance (default: 5).
    #[serde(default = "default_max_risk_percent")]
    pub max_risk_percent: Decimal,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            max_risk_percent: default_max_risk_percent(),
        }
    }
}

fn default_initial_balance() -> Decimal {
    DEFAULT_INITIAL_BALANCE
}

fn default_max_risk_percent() -> Decimal {
    Decimal::new(5, 0)
}
