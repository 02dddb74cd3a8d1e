//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `ROOICELL_DATA_DIR` - Directory holding persisted state (default: .rooicell)
//! - `ROOICELL_CATALOG_URL` - Remote catalog JSON; bundled catalog when unset
//! - `ROOICELL_CATALOG_TTL_SECS` - Remote catalog cache lifetime (default: 300)
//! - `ROOICELL_ORDER_PHONE` - WhatsApp number orders go to (default: 77471658747)
//! - `ROOICELL_WATCH_INTERVAL_MS` - Storage watch poll interval (default: 500)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::order::DEFAULT_ORDER_PHONE;

const DEFAULT_DATA_DIR: &str = ".rooicell";
const DEFAULT_CATALOG_TTL_SECS: &str = "300";
const DEFAULT_WATCH_INTERVAL_MS: &str = "500";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory for `FileStorage`
    pub data_dir: PathBuf,
    /// Remote catalog source
    pub catalog_url: Option<Url>,
    /// How long a fetched catalog is reused
    pub catalog_ttl: Duration,
    /// WhatsApp order number
    pub order_phone: String,
    /// How often other processes' writes are picked up
    pub watch_interval: Duration,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            catalog_url: None,
            catalog_ttl: Duration::from_secs(300),
            order_phone: DEFAULT_ORDER_PHONE.to_string(),
            watch_interval: Duration::from_millis(500),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(get_env_or_default(&lookup, "ROOICELL_DATA_DIR", DEFAULT_DATA_DIR));

        let catalog_url = get_optional_env(&lookup, "ROOICELL_CATALOG_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("ROOICELL_CATALOG_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let catalog_ttl = Duration::from_secs(get_parsed(
            &lookup,
            "ROOICELL_CATALOG_TTL_SECS",
            DEFAULT_CATALOG_TTL_SECS,
        )?);

        let order_phone = get_env_or_default(&lookup, "ROOICELL_ORDER_PHONE", DEFAULT_ORDER_PHONE);
        if !order_phone.chars().any(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidEnvVar(
                "ROOICELL_ORDER_PHONE".to_string(),
                "must contain digits".to_string(),
            ));
        }

        let watch_ms: u64 = get_parsed(&lookup, "ROOICELL_WATCH_INTERVAL_MS", DEFAULT_WATCH_INTERVAL_MS)?;
        if watch_ms == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ROOICELL_WATCH_INTERVAL_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            data_dir,
            catalog_url,
            catalog_ttl,
            order_phone,
            watch_interval: Duration::from_millis(watch_ms),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable, treating empty values as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Get a variable parsed as `T`, with a default.
fn get_parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(lookup, key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".rooicell"));
        assert!(config.catalog_url.is_none());
        assert_eq!(config.catalog_ttl, Duration::from_secs(300));
        assert_eq!(config.order_phone, "77471658747");
        assert_eq!(config.watch_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ROOICELL_DATA_DIR", "/tmp/rooicell"),
            ("ROOICELL_CATALOG_URL", "https://cdn.example.kz/catalog.json"),
            ("ROOICELL_CATALOG_TTL_SECS", "60"),
            ("ROOICELL_ORDER_PHONE", "+7 700 000 00 00"),
            ("ROOICELL_WATCH_INTERVAL_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/rooicell"));
        assert_eq!(
            config.catalog_url.unwrap().as_str(),
            "https://cdn.example.kz/catalog.json"
        );
        assert_eq!(config.catalog_ttl, Duration::from_secs(60));
        assert_eq!(config.watch_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_empty_catalog_url_is_unset() {
        let config = config_from(&[("ROOICELL_CATALOG_URL", "  ")]).unwrap();
        assert!(config.catalog_url.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = config_from(&[("ROOICELL_CATALOG_TTL_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "ROOICELL_CATALOG_TTL_SECS"));

        let err = config_from(&[("ROOICELL_CATALOG_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = config_from(&[("ROOICELL_WATCH_INTERVAL_MS", "0")]).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));

        assert!(config_from(&[("ROOICELL_ORDER_PHONE", "shop")]).is_err());
    }
}
