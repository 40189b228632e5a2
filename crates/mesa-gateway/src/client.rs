//! # Payment Gateway Client
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Hosted Checkout Flow                                 │
//! │                                                                         │
//! │  mesa-engine              PesapalClient              Gateway           │
//! │       │                         │                       │              │
//! │       │  request_token()        │  POST RequestToken    │              │
//! │       │────────────────────────►│──────────────────────►│              │
//! │       │                         │◄──────────────────────│ token        │
//! │       │                         │                       │              │
//! │       │  submit_order(token,..) │  POST SubmitOrder     │              │
//! │       │────────────────────────►│──────────────────────►│              │
//! │       │◄────────────────────────│◄──────────────────────│ redirect_url │
//! │       │                         │                       │              │
//! │   customer is redirected; later the gateway calls back and the host    │
//! │   records the payment with record_external_payment                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use mesa_core::Money;

const TOKEN_PATH: &str = "api/Auth/RequestToken";
const SUBMIT_ORDER_PATH: &str = "api/Transactions/SubmitOrderRequest";

const TOKEN_ENDPOINT: &str = "RequestToken";
const SUBMIT_ORDER_ENDPOINT: &str = "SubmitOrderRequest";

// =============================================================================
// Public Types
// =============================================================================

/// Bearer token returned by the auth call.
#[derive(Debug, Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(SecretString::new(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// What the engine asks the gateway to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Merchant reference; the gateway echoes it back in the callback.
    pub order_id: String,
    pub amount: Money,
    pub description: String,
    pub callback_url: Url,
}

/// The gateway's answer to an order submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedOrder {
    pub tracking_id: String,
    pub merchant_reference: String,
    pub redirect_url: Url,
}

/// The two gateway calls the session flow needs.
///
/// Implementations make exactly one HTTP attempt per call.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Exchanges the consumer credentials for a bearer token.
    async fn request_token(&self) -> GatewayResult<AccessToken>;

    /// Submits a payment order and returns where to send the customer.
    async fn submit_order(
        &self,
        token: &AccessToken,
        request: &PaymentRequest,
    ) -> GatewayResult<SubmittedOrder>;
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct TokenRequestBody<'a> {
    consumer_key: &'a str,
    consumer_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponseBody {
    token: Option<String>,
    error: Option<WireError>,
}

#[derive(Debug, Serialize)]
struct SubmitOrderBody<'a> {
    id: &'a str,
    currency: &'a str,
    amount: i64,
    description: &'a str,
    callback_url: &'a str,
    notification_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitOrderResponseBody {
    order_tracking_id: Option<String>,
    merchant_reference: Option<String>,
    redirect_url: Option<String>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl WireError {
    fn into_rejection(self, endpoint: &'static str) -> GatewayError {
        GatewayError::Rejected {
            endpoint,
            code: self.code.unwrap_or_else(|| "unknown".to_string()),
            message: self.message.unwrap_or_default(),
        }
    }
}

// =============================================================================
// Pesapal Client
// =============================================================================

/// reqwest-backed client for a Pesapal-style v3 API.
#[derive(Debug, Clone)]
pub struct PesapalClient {
    client: Client,
    config: GatewayConfig,
}

impl PesapalClient {
    /// Builds the HTTP client with the configured timeout.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(PesapalClient { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Reads a response: non-2xx becomes `Status`, 2xx is decoded as `T`.
    async fn read_json<T: DeserializeOwned>(
        endpoint: &'static str,
        response: Response,
    ) -> GatewayResult<T> {
        let status = response.status();
        let body = response.text().await?;

        debug!(endpoint, status = %status, "Gateway response");

        if !status.is_success() {
            return Err(GatewayError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::InvalidResponse {
            endpoint,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for PesapalClient {
    async fn request_token(&self) -> GatewayResult<AccessToken> {
        let body = TokenRequestBody {
            consumer_key: &self.config.consumer_key,
            consumer_secret: self.config.consumer_secret.expose_secret(),
        };

        let response = self
            .client
            .post(self.config.endpoint(TOKEN_PATH))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let parsed: TokenResponseBody = Self::read_json(TOKEN_ENDPOINT, response).await?;

        if let Some(error) = parsed.error {
            return Err(error.into_rejection(TOKEN_ENDPOINT));
        }

        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .ok_or(GatewayError::MissingField {
                endpoint: TOKEN_ENDPOINT,
                field: "token",
            })?;

        debug!("Gateway token issued");
        Ok(AccessToken::new(token))
    }

    async fn submit_order(
        &self,
        token: &AccessToken,
        request: &PaymentRequest,
    ) -> GatewayResult<SubmittedOrder> {
        let body = SubmitOrderBody {
            id: &request.order_id,
            currency: &self.config.currency,
            amount: request.amount.units(),
            description: &request.description,
            callback_url: request.callback_url.as_str(),
            notification_id: &self.config.notification_id,
        };

        let response = self
            .client
            .post(self.config.endpoint(SUBMIT_ORDER_PATH))
            .bearer_auth(token.expose())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let parsed: SubmitOrderResponseBody =
            Self::read_json(SUBMIT_ORDER_ENDPOINT, response).await?;

        if let Some(error) = parsed.error {
            return Err(error.into_rejection(SUBMIT_ORDER_ENDPOINT));
        }

        let redirect_url = parsed.redirect_url.ok_or(GatewayError::MissingField {
            endpoint: SUBMIT_ORDER_ENDPOINT,
            field: "redirect_url",
        })?;
        let redirect_url =
            Url::parse(&redirect_url).map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;

        let tracking_id = parsed.order_tracking_id.ok_or(GatewayError::MissingField {
            endpoint: SUBMIT_ORDER_ENDPOINT,
            field: "order_tracking_id",
        })?;

        info!(
            order_id = %request.order_id,
            tracking_id = %tracking_id,
            amount = request.amount.units(),
            "Gateway order submitted"
        );

        Ok(SubmittedOrder {
            tracking_id,
            merchant_reference: parsed
                .merchant_reference
                .unwrap_or_else(|| request.order_id.clone()),
            redirect_url,
        })
    }
}
