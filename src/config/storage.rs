//! Storage configuration.

use serde::Deserialize;

use crate::storage::DEFAULT_NAMESPACE;

/// Account persistence settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Persist to SQLite when true; keep the account in memory otherwise.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Path to the SQLite database file.
    #[serde(default = "default_path")]
    pub path: String,
    /// Key the account record is stored under.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_path(),
            namespace: default_namespace(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_path() -> String {
    "paper_terminal.db".to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}
