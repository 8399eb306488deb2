pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ats::handlers::handle_ats_scan;
use crate::errors::AppError;
use crate::orders::handlers;
use crate::state::AppState;

/// Resume payloads can embed long free text; anything past this is rejected.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index_handler))
        .route("/health", get(health::health_handler))
        .route("/api/ats-scan", post(handle_ats_scan))
        .route(
            "/api/payment/create-order",
            post(handlers::handle_create_order),
        )
        .route("/api/payment/verify", post(handlers::handle_verify_payment))
        .route("/api/download/resend", post(handlers::handle_resend))
        .route("/api/download/:token", get(handlers::handle_download))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
