//! Store configuration loaded from environment variables.
//!
//! All settings have defaults so the store works with zero configuration.

use std::path::PathBuf;

use gigboard_shared::constants::DEFAULT_PLATFORM_FEE_RATE;

/// Which backend the collections are serialized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    File,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "file" | "disk" => Ok(Self::File),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Env: `GIGBOARD_BACKEND` (`memory` / `file`)
    /// Default: `file`
    pub backend: BackendKind,

    /// Directory of the file backend. `None` uses the platform data dir.
    /// Env: `GIGBOARD_DATA_DIR`
    pub data_dir: Option<PathBuf>,

    /// Share of a completed gig's pay recorded as the platform fee.
    /// Env: `GIGBOARD_FEE_RATE`
    /// Default: `0.10`
    pub platform_fee_rate: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::File,
            data_dir: None,
            platform_fee_rate: DEFAULT_PLATFORM_FEE_RATE,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("GIGBOARD_BACKEND") {
            match val.parse::<BackendKind>() {
                Ok(kind) => config.backend = kind,
                Err(e) => tracing::warn!(value = %val, error = %e, "Invalid GIGBOARD_BACKEND, using default"),
            }
        }

        if let Some(dir) = lookup("GIGBOARD_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(val) = lookup("GIGBOARD_FEE_RATE") {
            match val.parse::<f64>() {
                Ok(rate) if (0.0..=1.0).contains(&rate) => config.platform_fee_rate = rate,
                _ => tracing::warn!(value = %val, "Invalid GIGBOARD_FEE_RATE, using default"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, BackendKind::File);
        assert_eq!(config.data_dir, None);
        assert_eq!(config.platform_fee_rate, DEFAULT_PLATFORM_FEE_RATE);
    }

    #[test]
    fn test_env_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("GIGBOARD_BACKEND", "Memory"),
            ("GIGBOARD_DATA_DIR", "/tmp/gigboard"),
            ("GIGBOARD_FEE_RATE", "0.15"),
        ]));
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/gigboard")));
        assert_eq!(config.platform_fee_rate, 0.15);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("GIGBOARD_BACKEND", "postgres"),
            ("GIGBOARD_FEE_RATE", "1.5"),
        ]));
        assert_eq!(config, StoreConfig::default());
    }
}
