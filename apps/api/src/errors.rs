use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Expired: {0}")]
    Expired(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Payment signature mismatch")]
    SignatureMismatch,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Mailer error: {0}")]
    Mailer(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Expired(_) => "EXPIRED",
            AppError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            AppError::SignatureMismatch => "SIGNATURE_MISMATCH",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Gateway(_) => "GATEWAY_ERROR",
            AppError::Mailer(_) => "MAILER_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::SignatureMismatch => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Expired(_) => StatusCode::GONE,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Database(_)
            | AppError::Gateway(_)
            | AppError::Mailer(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Expired(msg) => json!({
                "success": false,
                "error": msg,
                "code": code,
            }),
            AppError::SignatureMismatch => json!({
                "success": false,
                "error": "Invalid payment signature",
                "code": code,
            }),
            AppError::PayloadTooLarge => json!({
                "success": false,
                "error": "Request body exceeds the 10 MB limit",
                "code": code,
            }),
            AppError::Database(_)
            | AppError::Gateway(_)
            | AppError::Mailer(_)
            | AppError::Internal(_) => {
                // Callers only ever see the id; the detail stays in the logs.
                let error_id = Uuid::new_v4();
                tracing::error!(%error_id, code, "{self:?}");
                json!({
                    "success": false,
                    "error": "An internal server error occurred",
                    "code": code,
                    "errorId": error_id,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_errors_map_to_distinct_statuses() {
        let (s, _) = body_json(AppError::NotFound("x".into())).await;
        assert_eq!(s, StatusCode::NOT_FOUND);
        let (s, _) = body_json(AppError::Forbidden("x".into())).await;
        assert_eq!(s, StatusCode::FORBIDDEN);
        let (s, _) = body_json(AppError::Expired("x".into())).await;
        assert_eq!(s, StatusCode::GONE);
        let (s, body) = body_json(AppError::SignatureMismatch).await;
        assert_eq!(s, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SIGNATURE_MISMATCH");
    }

    #[tokio::test]
    async fn test_client_error_body_carries_message() {
        let (_, body) = body_json(AppError::Validation("Email is required".into())).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Email is required");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let (s, body) =
            body_json(AppError::Internal(anyhow::anyhow!("connection string leaked"))).await;
        assert_eq!(s, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("connection string"));
        assert!(body["errorId"].is_string());
    }
}
