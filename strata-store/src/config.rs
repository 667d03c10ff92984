use crate::StoreResult;
use serde::{Deserialize, Serialize};

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Label attached to the store's log events.
    #[serde(default = "default_name")]
    pub name: String,
    /// Notify listeners even when a dispatch leaves the entity unchanged.
    #[serde(default)]
    pub notify_unchanged: bool,
    /// Maximum number of live subscriptions.
    #[serde(default = "default_max_listeners")]
    pub max_listeners: usize,
}

fn default_name() -> String {
    "entity".to_string()
}

fn default_max_listeners() -> usize {
    64
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            notify_unchanged: false,
            max_listeners: default_max_listeners(),
        }
    }
}

impl StoreConfig {
    /// Parses a JSON config; missing keys take their defaults.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
