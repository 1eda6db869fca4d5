//! Worker configuration loaded from environment variables

use std::sync::OnceLock;

use anyhow::{Context, Result};
use tracing::warn;

use crate::parser::{LineMapping, ParseOptions, Verbosity};
use crate::redis_manager::keys;

const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
const DEFAULT_RESULT_TTL_SECS: u64 = 3600; // 1 hour

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnoseConfig {
    pub redis_url: String,
    /// Job queue key (BLPOP)
    pub queue: String,
    /// Expiry of stored results
    pub result_ttl_secs: u64,
    /// Verbosity used when a job does not specify one
    pub verbosity: Verbosity,
    pub line_mapping: LineMapping,
}

impl Default for DiagnoseConfig {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.to_string(),
            queue: keys::DIAGNOSE_QUEUE.to_string(),
            result_ttl_secs: DEFAULT_RESULT_TTL_SECS,
            verbosity: Verbosity::default(),
            line_mapping: LineMapping::default(),
        }
    }
}

impl DiagnoseConfig {
    /// Build a config from a key lookup; missing keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("REDIS_URL") {
            config.redis_url = url;
        }
        if let Some(queue) = lookup("DIAGNOSE_QUEUE") {
            config.queue = queue;
        }
        if let Some(ttl) = lookup("DIAGNOSE_RESULT_TTL_SECS") {
            config.result_ttl_secs = ttl
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid DIAGNOSE_RESULT_TTL_SECS: {}", ttl))?;
        }
        if let Some(verbosity) = lookup("DIAGNOSE_VERBOSITY") {
            config.verbosity = verbosity
                .parse::<Verbosity>()
                .context("Invalid DIAGNOSE_VERBOSITY")?;
        }
        if let Some(mapping) = lookup("DIAGNOSE_LINE_MAPPING") {
            config.line_mapping = mapping
                .parse::<LineMapping>()
                .context("Invalid DIAGNOSE_LINE_MAPPING")?;
        }

        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            line_mapping: self.line_mapping,
        }
    }
}

/// Global worker configuration
static CONFIG: OnceLock<DiagnoseConfig> = OnceLock::new();

/// Initialize the global configuration from the environment
pub fn init_config() -> Result<&'static DiagnoseConfig> {
    let config = DiagnoseConfig::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}

/// Get the global configuration
pub fn get_config() -> &'static DiagnoseConfig {
    CONFIG.get().unwrap_or_else(|| {
        static DEFAULT: OnceLock<DiagnoseConfig> = OnceLock::new();
        DEFAULT.get_or_init(|| {
            warn!("Diagnose config not initialized, using defaults");
            DiagnoseConfig::default()
        })
    })
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = DiagnoseConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, DiagnoseConfig::default());
        assert_eq!(config.queue, "diagnose:queue");
        assert_eq!(config.result_ttl_secs, 3600);
    }

    #[test]
    fn test_overrides() {
        let config = DiagnoseConfig::from_lookup(lookup_from(&[
            ("REDIS_URL", "redis://cache:6380"),
            ("DIAGNOSE_RESULT_TTL_SECS", "60"),
            ("DIAGNOSE_VERBOSITY", "Advanced"),
            ("DIAGNOSE_LINE_MAPPING", "wrapper_offset"),
        ]))
        .unwrap();

        assert_eq!(config.redis_url, "redis://cache:6380");
        assert_eq!(config.result_ttl_secs, 60);
        assert_eq!(config.verbosity, Verbosity::Advanced);
        assert_eq!(
            config.parse_options().line_mapping,
            LineMapping::WrapperOffset
        );
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(DiagnoseConfig::from_lookup(lookup_from(&[("DIAGNOSE_VERBOSITY", "loud")])).is_err());
        assert!(
            DiagnoseConfig::from_lookup(lookup_from(&[("DIAGNOSE_RESULT_TTL_SECS", "soon")]))
                .is_err()
        );
    }

    #[test]
    fn test_get_config_falls_back_to_defaults() {
        assert_eq!(get_config().queue, "diagnose:queue");
    }
}
