//! Payment gateway client.
//!
//! Only order creation talks to the gateway over HTTP. Payment confirmation
//! arrives through the client and is checked locally against the callback
//! signature (see `orders::signature`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

pub const DEFAULT_API_URL: &str = "https://api.razorpay.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Parameters for a gateway-side order.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrderRequest {
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    /// Our local order id.
    pub receipt: String,
    pub notes: OrderNotes,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotes {
    pub email: String,
    pub template_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: &GatewayOrderRequest)
        -> Result<GatewayOrder, GatewayError>;
}

#[derive(Debug, Deserialize)]
struct RazorpayError {
    error: RazorpayErrorBody,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorBody {
    description: String,
}

/// Razorpay Orders API over HTTP basic auth.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(base_url: String, key_id: String, key_secret: String) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key_id,
            key_secret,
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, GatewayError> {
        let response = self
            .client
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RazorpayError>(&body)
                .map(|e| e.error.description)
                .unwrap_or(body);
            error!(status = status.as_u16(), %message, "Gateway rejected order creation");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let order: GatewayOrder = response.json().await?;
        debug!(
            gateway_order_id = %order.id,
            receipt = %request.receipt,
            amount = order.amount,
            currency = %order.currency,
            "Gateway order created"
        );
        Ok(order)
    }
}
