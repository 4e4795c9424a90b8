//! Client configuration loaded from environment variables.

use std::time::Duration;

use gigboard_shared::constants::DEFAULT_POLL_INTERVAL_MS;
use gigboard_store::StoreConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub store: StoreConfig,

    /// How often polling views reload.
    /// Env: `GIGBOARD_POLL_INTERVAL_MS`
    /// Default: 2000 ms
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            store: StoreConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(val) = lookup("GIGBOARD_POLL_INTERVAL_MS") {
            match val.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.poll_interval = Duration::from_millis(ms),
                _ => tracing::warn!(value = %val, "Invalid GIGBOARD_POLL_INTERVAL_MS, using default"),
            }
        }

        config
    }
}
