//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                    | Default                          |
//! |-----------------------------|----------------------------------|
//! | `BISTRO_PORT`               | `8080`                           |
//! | `BISTRO_DB_PATH`            | platform data dir, `./bistro.db` |
//! | `BISTRO_TAX_RATE`           | `8` (percent)                    |
//! | `BISTRO_DELIVERY_FEE`       | `5.99`                           |
//! | `BISTRO_DEFAULT_LOCALE`     | `en`                             |
//! | `BISTRO_DB_MAX_CONNECTIONS` | `5`                              |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use bistro_core::validation::validate_tax_rate_bps;
use bistro_core::{Locale, Money, PricingPolicy, TaxRate};
use directories::ProjectDirs;
use rust_decimal::Decimal;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Sales tax applied to every order
    pub tax_rate: TaxRate,

    /// Flat fee for delivery orders
    pub delivery_fee: Money,

    /// Fallback locale for string tables
    pub default_locale: Locale,

    pub db_max_connections: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        ServerConfig::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("BISTRO_PORT", "8080")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BISTRO_PORT".to_string()))?;

        let db_path = match lookup("BISTRO_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path(),
        };

        let tax_rate = parse_tax_rate(&var("BISTRO_TAX_RATE", "8"))
            .ok_or_else(|| ConfigError::InvalidValue("BISTRO_TAX_RATE".to_string()))?;

        let delivery_fee = Decimal::from_str(var("BISTRO_DELIVERY_FEE", "5.99").trim())
            .ok()
            .and_then(Money::from_decimal)
            .filter(|fee| !fee.is_negative())
            .ok_or_else(|| ConfigError::InvalidValue("BISTRO_DELIVERY_FEE".to_string()))?;

        let default_locale = var("BISTRO_DEFAULT_LOCALE", "en")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BISTRO_DEFAULT_LOCALE".to_string()))?;

        let db_max_connections: u32 = var("BISTRO_DB_MAX_CONNECTIONS", "5")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BISTRO_DB_MAX_CONNECTIONS".to_string()))?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "BISTRO_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(ServerConfig {
            port,
            db_path,
            tax_rate,
            delivery_fee,
            default_locale,
            db_max_connections,
        })
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy::new(self.tax_rate, self.delivery_fee)
    }
}

/// Percent with at most two decimals ("8", "8.25") to basis points.
fn parse_tax_rate(raw: &str) -> Option<TaxRate> {
    let pct = Decimal::from_str(raw.trim()).ok()?;
    let bps = pct * Decimal::ONE_HUNDRED;
    if bps.fract() != Decimal::ZERO || bps.is_sign_negative() {
        return None;
    }
    let bps = u32::try_from(bps.mantissa() / 10i128.pow(bps.scale())).ok()?;
    validate_tax_rate_bps(bps).ok()?;
    Some(TaxRate::from_bps(bps))
}

/// Platform data directory, or the working directory when none is known.
///
/// - **macOS**: `~/Library/Application Support/com.bistro.server/bistro.db`
/// - **Linux**: `~/.local/share/bistroserver/bistro.db`
fn default_db_path() -> PathBuf {
    ProjectDirs::from("com", "bistro", "server")
        .map(|dirs| dirs.data_dir().join("bistro.db"))
        .unwrap_or_else(|| PathBuf::from("bistro.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.tax_rate.bps(), 800);
        assert_eq!(config.delivery_fee.cents(), 599);
        assert_eq!(config.default_locale, Locale::En);
        assert_eq!(config.db_max_connections, 5);
        assert!(config.db_path.ends_with("bistro.db"));
        assert_eq!(config.pricing_policy(), PricingPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BISTRO_PORT", "9000"),
            ("BISTRO_DB_PATH", "/tmp/x.db"),
            ("BISTRO_TAX_RATE", "8.25"),
            ("BISTRO_DELIVERY_FEE", "0"),
            ("BISTRO_DEFAULT_LOCALE", "fr"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.tax_rate.bps(), 825);
        assert_eq!(config.delivery_fee, Money::zero());
        assert_eq!(config.default_locale, Locale::Fr);
    }

    #[test]
    fn test_malformed_values_rejected() {
        for (key, value) in [
            ("BISTRO_PORT", "eighty"),
            ("BISTRO_TAX_RATE", "8.125"),
            ("BISTRO_TAX_RATE", "-1"),
            ("BISTRO_TAX_RATE", "101"),
            ("BISTRO_DELIVERY_FEE", "5.999"),
            ("BISTRO_DELIVERY_FEE", "-2"),
            ("BISTRO_DEFAULT_LOCALE", "klingon"),
            ("BISTRO_DB_MAX_CONNECTIONS", "0"),
        ] {
            match load(&[(key, value)]) {
                Err(ConfigError::InvalidValue(k)) => assert_eq!(k, key),
                other => panic!("{key}={value} should be rejected, got {other:?}"),
            }
        }
    }
}
