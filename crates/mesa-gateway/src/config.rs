//! # Gateway Configuration
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base_url          https://cybqa.pesapal.com/pesapalv3                 │
//! │  consumer_key      issued by the gateway                               │
//! │  consumer_secret   issued by the gateway (SecretString)                │
//! │  notification_id   id of the registered IPN (callback) URL             │
//! │  currency          UGX                                                 │
//! │  timeout           per request, default 15s                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loading from the environment lives in `mesa-engine`; this type only
//! carries the values.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::error::{GatewayError, GatewayResult};
use mesa_core::DEFAULT_CURRENCY;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: Url,
    pub consumer_key: String,
    pub consumer_secret: SecretString,
    pub notification_id: String,
    pub currency: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Creates a config with the default currency and timeout.
    ///
    /// ## Errors
    /// `InvalidUrl` if `base_url` is not an absolute http(s) URL,
    /// `InvalidConfig` if the key, secret or notification id is blank.
    pub fn new(
        base_url: &str,
        consumer_key: impl Into<String>,
        consumer_secret: SecretString,
        notification_id: impl Into<String>,
    ) -> GatewayResult<Self> {
        let base_url =
            Url::parse(base_url.trim()).map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                base_url.scheme()
            )));
        }

        let config = GatewayConfig {
            base_url,
            consumer_key: consumer_key.into(),
            consumer_secret,
            notification_id: notification_id.into(),
            currency: DEFAULT_CURRENCY.to_string(),
            timeout: DEFAULT_TIMEOUT,
        };

        if config.consumer_key.trim().is_empty() {
            return Err(GatewayError::InvalidConfig("consumer key is empty".into()));
        }
        if config.consumer_secret.expose_secret().trim().is_empty() {
            return Err(GatewayError::InvalidConfig("consumer secret is empty".into()));
        }
        if config.notification_id.trim().is_empty() {
            return Err(GatewayError::InvalidConfig("notification id is empty".into()));
        }

        Ok(config)
    }

    /// Sets the currency code sent with every order.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{base_url}/{path}`, keeping any path prefix on the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
