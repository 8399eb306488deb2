use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// GET /
/// Lists the public endpoints.
pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "success": true,
        "service": "resumepro-api",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /health",
            "atsScan": "POST /api/ats-scan",
            "createOrder": "POST /api/payment/create-order",
            "verifyPayment": "POST /api/payment/verify",
            "download": "GET /api/download/:token",
            "resendLink": "POST /api/download/resend",
        }
    }))
}
