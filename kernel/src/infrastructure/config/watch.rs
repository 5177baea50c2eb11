//! File watch configuration.

use serde::Deserialize;

/// Settings for the file watch manager.
#[derive(Debug, Deserialize, Clone)]
pub struct WatchSettings {
    /// Quiet period before a burst of notifications for one path is
    /// collapsed into a single re-read (default: 75)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    75
}
