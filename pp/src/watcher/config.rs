//! Watcher configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the ChangeWatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Whether interactive sessions watch the base directory at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Quiet window in milliseconds; events inside it collapse into one signal
    #[serde(default = "default_debounce_ms", rename = "debounce-ms")]
    pub debounce_ms: u64,

    /// Capacity of the signal channel between the debouncer and its consumer
    #[serde(default = "default_channel_capacity", rename = "channel-capacity")]
    pub channel_capacity: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_channel_capacity() -> usize {
    16
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            debounce_ms: default_debounce_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl WatcherConfig {
    /// Get the debounce window as a Duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatcherConfig::default();
        assert!(config.enabled);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.channel_capacity, 16);
    }

    #[test]
    fn test_debounce_duration() {
        let config = WatcherConfig {
            debounce_ms: 1500,
            ..Default::default()
        };
        assert_eq!(config.debounce(), Duration::from_millis(1500));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: WatcherConfig = serde_yaml::from_str("debounce-ms: 50").unwrap();
        assert_eq!(config.debounce_ms, 50);
        assert!(config.enabled);
    }
}
