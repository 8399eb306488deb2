use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Idempotent schema bootstrap, one statement per entry.
const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id                 TEXT PRIMARY KEY,
        email              TEXT NOT NULL,
        gateway_order_id   TEXT NOT NULL UNIQUE,
        gateway_payment_id TEXT,
        gateway_signature  TEXT,
        resume_data        TEXT NOT NULL,
        template_id        TEXT NOT NULL,
        payment_status     TEXT NOT NULL DEFAULT 'pending'
                           CHECK (payment_status IN ('pending', 'completed', 'failed')),
        amount             BIGINT NOT NULL,
        currency           TEXT NOT NULL,
        download_token     TEXT NOT NULL UNIQUE,
        created_at         BIGINT NOT NULL,
        expires_at         BIGINT NOT NULL,
        download_count     INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_orders_email ON orders (email)",
    "CREATE INDEX IF NOT EXISTS idx_orders_payment_status ON orders (payment_status)",
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to apply database schema")?;
    }
    info!("Database schema ready");
    Ok(())
}
