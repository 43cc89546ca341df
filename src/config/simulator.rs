//! Price feed simulator configuration.

use serde::Deserialize;
use std::time::Duration;

use super::duration;
use crate::feed::DEFAULT_TICK_INTERVAL;

/// Simulated feed and terminal loop settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    /// Interval between price ticks (default: 2s).
    #[serde(default = "default_tick_interval", with = "duration")]
    pub tick_interval: Duration,
    /// Seed for a reproducible price walk; random when absent.
    pub seed: Option<u64>,
    /// Interval between account summary log lines (default: 30s).
    #[serde(default = "default_summary_interval", with = "duration")]
    pub summary_interval: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            seed: None,
            summary_interval: default_summary_interval(),
        }
    }
}

fn default_tick_interval() -> Duration {
    DEFAULT_TICK_INTERVAL
}

fn default_summary_interval() -> Duration {
    Duration::from_secs(30)
}
