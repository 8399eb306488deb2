use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::orders::lifecycle::PaymentConfirmation;
use crate::orders::service::CreateOrderInput;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub email: String,
    /// Kept as raw JSON so the stored text is exactly what the client sent.
    pub resume_data: Option<Box<RawValue>>,
    #[serde(default)]
    pub template_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(default, rename = "gateway_order_id", alias = "razorpay_order_id")]
    pub gateway_order_id: String,
    #[serde(default, rename = "payment_id", alias = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(default, rename = "signature", alias = "razorpay_signature")]
    pub signature: String,
    pub template_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
    pub download_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub success: bool,
    pub resume_data: Box<RawValue>,
    pub template_id: String,
    pub download_count: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendRequest {
    #[serde(default)]
    pub email: String,
    pub template_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/payment/create-order
pub async fn handle_create_order(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    let resume_data = req
        .resume_data
        .map(|raw| raw.get().to_string())
        .ok_or_else(|| AppError::Validation("Resume data is required".to_string()))?;

    let checkout = state
        .orders
        .create_order(CreateOrderInput {
            email: req.email,
            resume_data,
            template_id: req.template_id,
        })
        .await?;

    Ok(Json(CreateOrderResponse {
        success: true,
        order_id: checkout.gateway_order_id,
        amount: checkout.amount,
        currency: checkout.currency,
        key_id: checkout.key_id,
    }))
}

/// POST /api/payment/verify
pub async fn handle_verify_payment(
    State(state): State<AppState>,
    AppJson(req): AppJson<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    let order = state
        .orders
        .verify_payment(
            PaymentConfirmation {
                gateway_order_id: req.gateway_order_id,
                payment_id: req.payment_id,
                signature: req.signature,
            },
            req.template_name,
        )
        .await?;

    Ok(Json(VerifyPaymentResponse {
        success: true,
        message: "Payment verified successfully".to_string(),
        download_token: order.download_token,
    }))
}

/// GET /api/download/:token
pub async fn handle_download(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<DownloadResponse>, AppError> {
    let redemption = state.orders.redeem(&token).await?;

    // Stored text was validated as JSON when the order was created.
    let resume_data = RawValue::from_string(redemption.resume_data)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored resume data is not JSON: {e}")))?;

    Ok(Json(DownloadResponse {
        success: true,
        resume_data,
        template_id: redemption.template_id,
        download_count: redemption.download_count,
    }))
}

/// POST /api/download/resend
pub async fn handle_resend(
    State(state): State<AppState>,
    AppJson(req): AppJson<ResendRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.orders.resend_link(&req.email, req.template_name).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Download link sent to your email".to_string(),
    }))
}
