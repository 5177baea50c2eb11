//! Event stream and history configuration.

use serde::Deserialize;

/// Settings for the broadcast channel.
#[derive(Debug, Deserialize, Clone)]
pub struct EventSettings {
    /// Events buffered per subscriber before it is considered lagging
    /// and disconnected (default: 256)
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Settings for the closed-diff history.
#[derive(Debug, Deserialize, Clone)]
pub struct HistorySettings {
    /// Maximum number of closed diffs remembered (default: 50)
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    256
}

fn default_history_capacity() -> usize {
    50
}
