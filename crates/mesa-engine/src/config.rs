//! Engine configuration.
//!
//! Loaded from environment variables with fallback to defaults. The gateway
//! section is optional: without `MESA_GATEWAY_BASE_URL` the engine runs
//! cash and mobile-money payments only and `create_payment_session` fails
//! with `GatewayNotConfigured`.
//!
//! | Variable                        | Default            |
//! |---------------------------------|--------------------|
//! | `MESA_DATABASE_PATH`            | `./mesa.db`        |
//! | `MESA_DB_MAX_CONNECTIONS`       | `5`                |
//! | `MESA_GATEWAY_BASE_URL`         | unset (no gateway) |
//! | `MESA_GATEWAY_CONSUMER_KEY`     | required with URL  |
//! | `MESA_GATEWAY_CONSUMER_SECRET`  | required with URL  |
//! | `MESA_GATEWAY_NOTIFICATION_ID`  | required with URL  |
//! | `MESA_CURRENCY`                 | `UGX`              |
//! | `MESA_GATEWAY_TIMEOUT_SECS`     | `15`               |

use secrecy::SecretString;
use std::env;
use std::time::Duration;

use mesa_core::DEFAULT_CURRENCY;
use mesa_db::DbConfig;
use mesa_gateway::GatewayConfig;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database: DbConfig,
    pub gateway: Option<GatewayConfig>,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path =
            lookup("MESA_DATABASE_PATH").unwrap_or_else(|| "./mesa.db".to_string());

        let max_connections: u32 = lookup("MESA_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MESA_DB_MAX_CONNECTIONS".to_string()))?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "MESA_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        let database = DbConfig::new(database_path).max_connections(max_connections);

        let gateway = match lookup("MESA_GATEWAY_BASE_URL") {
            Some(base_url) => Some(Self::gateway_from_lookup(&base_url, &lookup)?),
            None => None,
        };

        Ok(EngineConfig { database, gateway })
    }

    fn gateway_from_lookup<F>(base_url: &str, lookup: &F) -> Result<GatewayConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingRequired(key.to_string()))
        };

        let consumer_key = required("MESA_GATEWAY_CONSUMER_KEY")?;
        let consumer_secret = SecretString::new(required("MESA_GATEWAY_CONSUMER_SECRET")?);
        let notification_id = required("MESA_GATEWAY_NOTIFICATION_ID")?;

        let currency = lookup("MESA_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let timeout_secs: u64 = lookup("MESA_GATEWAY_TIMEOUT_SECS")
            .unwrap_or_else(|| "15".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MESA_GATEWAY_TIMEOUT_SECS".to_string()))?;

        let config = GatewayConfig::new(base_url, consumer_key, consumer_secret, notification_id)
            .map_err(|_| ConfigError::InvalidValue("MESA_GATEWAY_BASE_URL".to_string()))?
            .currency(currency)
            .timeout(Duration::from_secs(timeout_secs));

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
