use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "unknown payment status '{other}'"
            ))),
        }
    }
}

/// A purchase of one rendered resume. The only durable entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: String,
    pub email: String,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    /// Serialized resume JSON exactly as submitted.
    pub resume_data: String,
    pub template_id: String,
    pub payment_status: PaymentStatus,
    pub amount: i64,
    pub currency: String,
    pub download_token: String,
    /// Epoch millis.
    pub created_at: i64,
    /// Epoch millis.
    pub expires_at: i64,
    pub download_count: i32,
}

impl Order {
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }

    pub fn is_redeemable_at(&self, now_ms: i64) -> bool {
        self.payment_status == PaymentStatus::Completed && !self.is_expired_at(now_ms)
    }
}

/// Row shape of the `orders` table.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: String,
    pub email: String,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub resume_data: String,
    pub template_id: String,
    pub payment_status: String,
    pub amount: i64,
    pub currency: String,
    pub download_token: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub download_count: i32,
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            payment_status: row.payment_status.parse()?,
            id: row.id,
            email: row.email,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            gateway_signature: row.gateway_signature,
            resume_data: row.resume_data,
            template_id: row.template_id,
            amount: row.amount,
            currency: row.currency,
            download_token: row.download_token,
            created_at: row.created_at,
            expires_at: row.expires_at,
            download_count: row.download_count,
        })
    }
}
