//! Gateway configuration, read from the environment (and `.env`).

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::info;
use url::Url;

pub const DEFAULT_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: String,
    pub provider_url: Url,
    pub provider_key: String,
    pub provider_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `load` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("JOTTER_ADDR").unwrap_or_else(|| {
            info!("JOTTER_ADDR not set, using default: {}", DEFAULT_ADDR);
            DEFAULT_ADDR.to_string()
        });

        let raw_url = required(&lookup, "SUPABASE_URL")?;
        let provider_url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            key: "SUPABASE_URL",
            reason: e.to_string(),
        })?;

        let provider_key = required(&lookup, "SUPABASE_ANON_KEY")?;

        let timeout_secs = match lookup("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "PROVIDER_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "PROVIDER_TIMEOUT_SECS",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Self {
            addr,
            provider_url,
            provider_key,
            provider_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}
