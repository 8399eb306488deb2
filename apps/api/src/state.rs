use std::sync::Arc;

use crate::ats::AtsScanner;
use crate::orders::service::OrderService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Stateless; shared so custom rule sets can be swapped in at startup.
    pub scanner: Arc<AtsScanner>,
    pub orders: Arc<OrderService>,
}
