//! Order persistence.
//!
//! `OrderStore` is the seam between the lifecycle logic and whatever holds the
//! rows. `PgOrderStore` backs production; `MemoryOrderStore` backs tests and
//! local runs without a database.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::order::{Order, OrderRow, PaymentStatus};

/// The two unique lookup keys an order can be found by.
#[derive(Debug, Clone, Copy)]
pub enum OrderKey<'a> {
    DownloadToken(&'a str),
    GatewayOrderId(&'a str),
}

/// Fields written when the gateway reports back on a payment.
#[derive(Debug, Clone)]
pub struct PaymentUpdate {
    pub payment_id: String,
    pub signature: String,
    pub status: PaymentStatus,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), AppError>;

    async fn find_by(&self, key: OrderKey<'_>) -> Result<Option<Order>, AppError>;

    /// All orders for an email, most recently created first.
    async fn find_by_email(&self, email: &str) -> Result<Vec<Order>, AppError>;

    /// Applies `update` only while the order is still pending.
    /// Returns `false` when no pending order matched.
    async fn update_payment(
        &self,
        gateway_order_id: &str,
        update: &PaymentUpdate,
    ) -> Result<bool, AppError>;

    async fn increment_download_count(&self, download_token: &str) -> Result<(), AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO orders
                (id, email, gateway_order_id, resume_data, template_id, payment_status,
                 amount, currency, download_token, created_at, expires_at, download_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&order.id)
        .bind(&order.email)
        .bind(&order.gateway_order_id)
        .bind(&order.resume_data)
        .bind(&order.template_id)
        .bind(order.payment_status.as_str())
        .bind(order.amount)
        .bind(&order.currency)
        .bind(&order.download_token)
        .bind(order.created_at)
        .bind(order.expires_at)
        .bind(order.download_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by(&self, key: OrderKey<'_>) -> Result<Option<Order>, AppError> {
        let (sql, value) = match key {
            OrderKey::DownloadToken(token) => {
                ("SELECT * FROM orders WHERE download_token = $1", token)
            }
            OrderKey::GatewayOrderId(id) => ("SELECT * FROM orders WHERE gateway_order_id = $1", id),
        };

        let row: Option<OrderRow> = sqlx::query_as(sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Order>, AppError> {
        let rows: Vec<OrderRow> =
            sqlx::query_as("SELECT * FROM orders WHERE email = $1 ORDER BY created_at DESC")
                .bind(email)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn update_payment(
        &self,
        gateway_order_id: &str,
        update: &PaymentUpdate,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET gateway_payment_id = $1,
                gateway_signature = $2,
                payment_status = $3
            WHERE gateway_order_id = $4 AND payment_status = 'pending'
            "#,
        )
        .bind(&update.payment_id)
        .bind(&update.signature)
        .bind(update.status.as_str())
        .bind(gateway_order_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn increment_download_count(&self, download_token: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE orders SET download_count = download_count + 1 WHERE download_token = $1",
        )
        .bind(download_token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_key(order: &Order, key: OrderKey<'_>) -> bool {
    match key {
        OrderKey::DownloadToken(token) => order.download_token == token,
        OrderKey::GatewayOrderId(id) => order.gateway_order_id == id,
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), AppError> {
        let mut orders = self.orders.write().await;
        let duplicate = orders.iter().any(|o| {
            o.id == order.id
                || o.download_token == order.download_token
                || o.gateway_order_id == order.gateway_order_id
        });
        if duplicate {
            return Err(AppError::Internal(anyhow!(
                "order {} violates a uniqueness constraint",
                order.id
            )));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn find_by(&self, key: OrderKey<'_>) -> Result<Option<Order>, AppError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| matches_key(o, key)).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Order>, AppError> {
        let orders = self.orders.read().await;
        let mut found: Vec<Order> = orders.iter().filter(|o| o.email == email).cloned().collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update_payment(
        &self,
        gateway_order_id: &str,
        update: &PaymentUpdate,
    ) -> Result<bool, AppError> {
        let mut orders = self.orders.write().await;
        let target = orders.iter_mut().find(|o| {
            o.gateway_order_id == gateway_order_id && o.payment_status == PaymentStatus::Pending
        });

        match target {
            Some(order) => {
                order.gateway_payment_id = Some(update.payment_id.clone());
                order.gateway_signature = Some(update.signature.clone());
                order.payment_status = update.status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn increment_download_count(&self, download_token: &str) -> Result<(), AppError> {
        let mut orders = self.orders.write().await;
        if let Some(order) = orders
            .iter_mut()
            .find(|o| o.download_token == download_token)
        {
            order.download_count += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_order(id: &str, email: &str, created_at: i64) -> Order {
        Order {
            id: id.to_string(),
            email: email.to_string(),
            gateway_order_id: format!("gw_{id}"),
            gateway_payment_id: None,
            gateway_signature: None,
            resume_data: "{}".to_string(),
            template_id: "modern".to_string(),
            payment_status: PaymentStatus::Pending,
            amount: 4900,
            currency: "INR".to_string(),
            download_token: format!("tok_{id}"),
            created_at,
            expires_at: created_at + 1_000,
            download_count: 0,
        }
    }

    fn completion() -> PaymentUpdate {
        PaymentUpdate {
            payment_id: "pay_1".to_string(),
            signature: "sig".to_string(),
            status: PaymentStatus::Completed,
        }
    }

    #[tokio::test]
    async fn test_find_by_either_key() {
        let store = MemoryOrderStore::new();
        store.insert(&make_order("a", "x@y.co", 1)).await.unwrap();

        let by_token = store.find_by(OrderKey::DownloadToken("tok_a")).await.unwrap();
        let by_gateway = store.find_by(OrderKey::GatewayOrderId("gw_a")).await.unwrap();
        assert_eq!(by_token.unwrap().id, "a");
        assert_eq!(by_gateway.unwrap().id, "a");
        assert!(store
            .find_by(OrderKey::DownloadToken("gw_a"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_keys_rejected() {
        let store = MemoryOrderStore::new();
        store.insert(&make_order("a", "x@y.co", 1)).await.unwrap();
        let mut dup = make_order("b", "x@y.co", 2);
        dup.download_token = "tok_a".to_string();
        assert!(store.insert(&dup).await.is_err());
    }

    #[tokio::test]
    async fn test_find_by_email_newest_first() {
        let store = MemoryOrderStore::new();
        store.insert(&make_order("old", "x@y.co", 10)).await.unwrap();
        store.insert(&make_order("new", "x@y.co", 20)).await.unwrap();
        store.insert(&make_order("other", "z@y.co", 30)).await.unwrap();

        let found = store.find_by_email("x@y.co").await.unwrap();
        let ids: Vec<_> = found.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_update_payment_only_applies_to_pending() {
        let store = MemoryOrderStore::new();
        store.insert(&make_order("a", "x@y.co", 1)).await.unwrap();

        assert!(store.update_payment("gw_a", &completion()).await.unwrap());

        let mut failure = completion();
        failure.status = PaymentStatus::Failed;
        assert!(!store.update_payment("gw_a", &failure).await.unwrap());

        let order = store
            .find_by(OrderKey::GatewayOrderId("gw_a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Completed);
        assert_eq!(order.gateway_payment_id.as_deref(), Some("pay_1"));
    }

    #[tokio::test]
    async fn test_increment_download_count() {
        let store = MemoryOrderStore::new();
        store.insert(&make_order("a", "x@y.co", 1)).await.unwrap();
        store.increment_download_count("tok_a").await.unwrap();
        store.increment_download_count("tok_a").await.unwrap();
        let order = store
            .find_by(OrderKey::DownloadToken("tok_a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.download_count, 2);
    }
}
