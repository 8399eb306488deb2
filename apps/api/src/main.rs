mod ats;
mod config;
mod db;
mod errors;
mod extract;
mod gateway;
mod mailer;
mod models;
mod orders;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ats::AtsScanner;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::gateway::RazorpayClient;
use crate::mailer::{LogMailer, Mailer, SesMailer};
use crate::orders::service::{OrderService, OrderSettings};
use crate::orders::store::PgOrderStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumePro API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    let gateway = RazorpayClient::new(
        config.razorpay_api_url.clone(),
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
    )
    .context("Failed to build payment gateway client")?;
    info!("Payment gateway client initialized ({})", config.razorpay_api_url);

    let mailer: Arc<dyn Mailer> = match &config.ses_region {
        Some(region) => {
            info!("Email delivery via SES in {region}");
            Arc::new(SesMailer::from_region(region.clone(), config.email_from.clone()).await)
        }
        None => {
            info!("SES_REGION not set; download link emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let orders = OrderService::new(
        Arc::new(PgOrderStore::new(db)),
        Arc::new(gateway),
        mailer,
        OrderSettings {
            amount: config.payment_amount,
            currency: config.payment_currency.clone(),
            validity_days: config.download_link_validity_days,
            key_id: config.razorpay_key_id.clone(),
            key_secret: config.razorpay_key_secret.clone(),
            signature_scheme: config.signature_scheme.clone(),
            frontend_url: config.frontend_url.clone(),
        },
    );

    let state = AppState {
        scanner: Arc::new(AtsScanner::default()),
        orders: Arc::new(orders),
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_url
                .parse::<HeaderValue>()
                .context("FRONTEND_URL is not a valid origin")?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
