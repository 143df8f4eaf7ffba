//! Storefront configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                 | Default                                |
//! |--------------------------|----------------------------------------|
//! | `GOONJ_DB_PATH`          | `<platform data dir>/goonj.db`         |
//! | `GOONJ_CATALOG_PATH`     | `data/books.json`                      |
//! | `GOONJ_STORE_NAME`       | `Goonj Library`                        |
//! | `GOONJ_CURRENCY`         | `INR`                                  |
//! | `GOONJ_ADMIN_EMAILS`     | empty (nobody may operate)             |
//! | `GOONJ_GATEWAY_KEY`      | `rzp_test_key`                         |
//! | `GOONJ_GATEWAY_DELAY_MS` | `1000`                                 |

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Storefront configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Catalog JSON file
    pub catalog_path: PathBuf,

    /// Name shown on the gateway's payment sheet
    pub store_name: String,

    /// ISO 4217 code sent to the gateway
    pub currency: String,

    /// Operator e-mail addresses, lowercased
    pub admin_emails: Vec<String>,

    /// Public key for the payment gateway
    pub gateway_key: String,

    /// How long the simulated gateway waits before answering
    pub gateway_delay: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup("GOONJ_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let currency = lookup("GOONJ_CURRENCY").unwrap_or_else(|| "INR".to_string());
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::InvalidValue("GOONJ_CURRENCY".to_string()));
        }

        let config = StorefrontConfig {
            db_path,

            catalog_path: lookup("GOONJ_CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/books.json")),

            store_name: lookup("GOONJ_STORE_NAME").unwrap_or_else(|| "Goonj Library".to_string()),

            currency,

            admin_emails: lookup("GOONJ_ADMIN_EMAILS")
                .map(|raw| parse_email_list(&raw))
                .unwrap_or_default(),

            gateway_key: lookup("GOONJ_GATEWAY_KEY").unwrap_or_else(|| "rzp_test_key".to_string()),

            gateway_delay: lookup("GOONJ_GATEWAY_DELAY_MS")
                .unwrap_or_else(|| "1000".to_string())
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidValue("GOONJ_GATEWAY_DELAY_MS".to_string()))?,
        };

        if config.store_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired("GOONJ_STORE_NAME".to_string()));
        }

        Ok(config)
    }
}

/// Splits a comma-separated address list, dropping blanks.
fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Platform data directory + `goonj.db`.
///
/// - **macOS**: `~/Library/Application Support/in.goonj.storefront/goonj.db`
/// - **Linux**: `~/.local/share/storefront/goonj.db`
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("in", "goonj", "storefront")
        .ok_or_else(|| ConfigError::MissingRequired("GOONJ_DB_PATH".to_string()))?;
    Ok(dirs.data_dir().join("goonj.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            StorefrontConfig::from_lookup(lookup(&[("GOONJ_DB_PATH", "/tmp/goonj.db")])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/goonj.db"));
        assert_eq!(config.catalog_path, PathBuf::from("data/books.json"));
        assert_eq!(config.store_name, "Goonj Library");
        assert_eq!(config.currency, "INR");
        assert!(config.admin_emails.is_empty());
        assert_eq!(config.gateway_key, "rzp_test_key");
        assert_eq!(config.gateway_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_admin_emails_are_normalised() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("GOONJ_DB_PATH", "/tmp/goonj.db"),
            ("GOONJ_ADMIN_EMAILS", " Ops@Goonj.in, ,desk@goonj.in "),
        ]))
        .unwrap();
        assert_eq!(config.admin_emails, vec!["ops@goonj.in", "desk@goonj.in"]);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = StorefrontConfig::from_lookup(lookup(&[
            ("GOONJ_DB_PATH", "/tmp/goonj.db"),
            ("GOONJ_GATEWAY_DELAY_MS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v) if v == "GOONJ_GATEWAY_DELAY_MS"));

        let err = StorefrontConfig::from_lookup(lookup(&[
            ("GOONJ_DB_PATH", "/tmp/goonj.db"),
            ("GOONJ_CURRENCY", "rupees"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }
}
