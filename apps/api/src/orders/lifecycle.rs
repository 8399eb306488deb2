//! Order state transitions: pending → completed | failed, then redemption
//! until expiry. Everything here works against an `OrderStore` and an explicit
//! clock so it can be driven directly from tests.

use chrono::Duration;

use crate::errors::AppError;
use crate::models::order::{Order, PaymentStatus};
use crate::models::resume::is_blank;
use crate::orders::signature::SignatureScheme;
use crate::orders::store::{OrderKey, OrderStore, PaymentUpdate};
use crate::orders::token::generate_download_token;

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: String,
    pub email: String,
    pub resume_data: String,
    pub template_id: String,
    pub amount: i64,
    pub currency: String,
    pub gateway_order_id: String,
}

/// What the client relays back from the gateway checkout.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub order: Order,
    /// False when the order was already completed by an earlier callback.
    pub newly_completed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Redemption {
    pub resume_data: String,
    pub template_id: String,
    /// Count before this redemption was recorded.
    pub download_count: i32,
}

fn require(value: &str, message: &str) -> Result<(), AppError> {
    if is_blank(Some(value)) {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(())
}

pub fn expiry_from(created_at: i64, validity_days: i64) -> i64 {
    created_at + Duration::days(validity_days).num_milliseconds()
}

pub async fn create_order(
    store: &dyn OrderStore,
    new: NewOrder,
    validity_days: i64,
    now_ms: i64,
) -> Result<Order, AppError> {
    require(&new.email, "Email is required")?;
    require(&new.resume_data, "Resume data is required")?;
    require(&new.template_id, "Template ID is required")?;
    require(&new.currency, "Currency is required")?;
    require(&new.gateway_order_id, "Gateway order ID is required")?;
    if new.amount <= 0 {
        return Err(AppError::Validation(
            "Amount must be a positive number of minor units".to_string(),
        ));
    }

    let order = Order {
        id: new.id,
        email: new.email,
        gateway_order_id: new.gateway_order_id,
        gateway_payment_id: None,
        gateway_signature: None,
        resume_data: new.resume_data,
        template_id: new.template_id,
        payment_status: PaymentStatus::Pending,
        amount: new.amount,
        currency: new.currency,
        download_token: generate_download_token(),
        created_at: now_ms,
        expires_at: expiry_from(now_ms, validity_days),
        download_count: 0,
    };

    store.insert(&order).await?;
    tracing::info!(
        order_id = %order.id,
        gateway_order_id = %order.gateway_order_id,
        amount = order.amount,
        "Order created"
    );
    Ok(order)
}

pub async fn verify_and_complete(
    store: &dyn OrderStore,
    scheme: &SignatureScheme,
    secret: &str,
    confirmation: &PaymentConfirmation,
) -> Result<Completion, AppError> {
    require(&confirmation.gateway_order_id, "Missing payment details")?;
    require(&confirmation.payment_id, "Missing payment details")?;
    require(&confirmation.signature, "Missing payment details")?;

    let gateway_order_id = confirmation.gateway_order_id.as_str();
    let order = store
        .find_by(OrderKey::GatewayOrderId(gateway_order_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let valid = scheme.verify(
        gateway_order_id,
        &confirmation.payment_id,
        &confirmation.signature,
        secret,
    )?;

    if !valid {
        let recorded = store
            .update_payment(
                gateway_order_id,
                &PaymentUpdate {
                    payment_id: confirmation.payment_id.clone(),
                    signature: confirmation.signature.clone(),
                    status: PaymentStatus::Failed,
                },
            )
            .await?;
        tracing::warn!(
            order_id = %order.id,
            gateway_order_id,
            recorded,
            "Payment signature mismatch"
        );
        return Err(AppError::SignatureMismatch);
    }

    match order.payment_status {
        PaymentStatus::Completed => {
            return Ok(Completion {
                order,
                newly_completed: false,
            })
        }
        PaymentStatus::Failed => {
            return Err(AppError::Forbidden(
                "Payment has already failed for this order".to_string(),
            ))
        }
        PaymentStatus::Pending => {}
    }

    let update = PaymentUpdate {
        payment_id: confirmation.payment_id.clone(),
        signature: confirmation.signature.clone(),
        status: PaymentStatus::Completed,
    };

    if store.update_payment(gateway_order_id, &update).await? {
        tracing::info!(order_id = %order.id, gateway_order_id, "Payment completed");
        let order = Order {
            gateway_payment_id: Some(update.payment_id),
            gateway_signature: Some(update.signature),
            payment_status: PaymentStatus::Completed,
            ..order
        };
        return Ok(Completion {
            order,
            newly_completed: true,
        });
    }

    // Another callback settled the order between our read and write.
    let current = store
        .find_by(OrderKey::GatewayOrderId(gateway_order_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    match current.payment_status {
        PaymentStatus::Completed => Ok(Completion {
            order: current,
            newly_completed: false,
        }),
        _ => Err(AppError::Forbidden(
            "Payment has already failed for this order".to_string(),
        )),
    }
}

pub async fn redeem(
    store: &dyn OrderStore,
    token: &str,
    now_ms: i64,
) -> Result<Redemption, AppError> {
    let order = store
        .find_by(OrderKey::DownloadToken(token))
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid or expired download link".to_string()))?;

    if order.payment_status != PaymentStatus::Completed {
        return Err(AppError::Forbidden(
            "Payment not completed for this order".to_string(),
        ));
    }
    if order.is_expired_at(now_ms) {
        return Err(AppError::Expired("Download link has expired".to_string()));
    }

    store.increment_download_count(token).await?;
    tracing::info!(order_id = %order.id, download_count = order.download_count + 1, "Resume downloaded");

    Ok(Redemption {
        resume_data: order.resume_data,
        template_id: order.template_id,
        download_count: order.download_count,
    })
}

/// Most recently created order for `email` that can still be redeemed.
pub async fn find_resend_target(
    store: &dyn OrderStore,
    email: &str,
    now_ms: i64,
) -> Result<Order, AppError> {
    store
        .find_by_email(email)
        .await?
        .into_iter()
        .find(|o| o.is_redeemable_at(now_ms))
        .ok_or_else(|| AppError::NotFound("No active paid orders found for this email".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::store::MemoryOrderStore;

    const SECRET: &str = "test_secret";
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn new_order(id: &str, email: &str) -> NewOrder {
        NewOrder {
            id: id.to_string(),
            email: email.to_string(),
            resume_data: r#"{"personalInfo":{"name":"Ada"},"skills":[]}"#.to_string(),
            template_id: "modern".to_string(),
            amount: 4900,
            currency: "INR".to_string(),
            gateway_order_id: format!("gw_{id}"),
        }
    }

    fn confirmation(gateway_order_id: &str, payment_id: &str) -> PaymentConfirmation {
        let signature = SignatureScheme::razorpay()
            .expected_signature(gateway_order_id, payment_id, SECRET)
            .unwrap();
        PaymentConfirmation {
            gateway_order_id: gateway_order_id.to_string(),
            payment_id: payment_id.to_string(),
            signature,
        }
    }

    async fn completed_order(store: &MemoryOrderStore, id: &str, now: i64) -> Order {
        create_order(store, new_order(id, "ada@example.com"), 365, now)
            .await
            .unwrap();
        verify_and_complete(
            store,
            &SignatureScheme::razorpay(),
            SECRET,
            &confirmation(&format!("gw_{id}"), "pay_1"),
        )
        .await
        .unwrap()
        .order
    }

    #[tokio::test]
    async fn test_create_order_starts_pending_with_expiry() {
        let store = MemoryOrderStore::new();
        let order = create_order(&store, new_order("a", "ada@example.com"), 365, 1_000)
            .await
            .unwrap();

        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.download_count, 0);
        assert_eq!(order.download_token.len(), 32);
        assert_eq!(order.expires_at, 1_000 + 365 * DAY_MS);
    }

    #[tokio::test]
    async fn test_create_order_rejects_blank_fields_without_writing() {
        let store = MemoryOrderStore::new();
        let blank_email = new_order("a", "  ");
        let err = create_order(&store, blank_email, 365, 0).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut blank_template = new_order("b", "ada@example.com");
        blank_template.template_id = String::new();
        assert!(create_order(&store, blank_template, 365, 0).await.is_err());

        assert!(store.find_by_email("ada@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_valid_signature_completes_order() {
        let store = MemoryOrderStore::new();
        create_order(&store, new_order("a", "ada@example.com"), 365, 0)
            .await
            .unwrap();

        let done = verify_and_complete(
            &store,
            &SignatureScheme::razorpay(),
            SECRET,
            &confirmation("gw_a", "pay_1"),
        )
        .await
        .unwrap();

        assert!(done.newly_completed);
        assert_eq!(done.order.payment_status, PaymentStatus::Completed);
        let stored = store
            .find_by(OrderKey::GatewayOrderId("gw_a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Completed);
        assert_eq!(stored.gateway_payment_id.as_deref(), Some("pay_1"));
        assert_eq!(stored.download_token, done.order.download_token);
    }

    #[tokio::test]
    async fn test_tampered_signature_fails_order() {
        let store = MemoryOrderStore::new();
        create_order(&store, new_order("a", "ada@example.com"), 365, 0)
            .await
            .unwrap();

        let mut tampered = confirmation("gw_a", "pay_1");
        tampered.payment_id = "pay_2".to_string();
        let err = verify_and_complete(&store, &SignatureScheme::razorpay(), SECRET, &tampered)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SignatureMismatch));

        let stored = store
            .find_by(OrderKey::GatewayOrderId("gw_a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Failed);

        // A failed order never hands out its token, even with a good signature.
        let err = verify_and_complete(
            &store,
            &SignatureScheme::razorpay(),
            SECRET,
            &confirmation("gw_a", "pay_1"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = redeem(&store, &stored.download_token, 0).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_bad_signature_does_not_reopen_completed_order() {
        let store = MemoryOrderStore::new();
        let order = completed_order(&store, "a", 0).await;

        let mut tampered = confirmation("gw_a", "pay_1");
        tampered.signature = "00".repeat(32);
        let err = verify_and_complete(&store, &SignatureScheme::razorpay(), SECRET, &tampered)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SignatureMismatch));

        let stored = store
            .find_by(OrderKey::DownloadToken(&order.download_token))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_replayed_verification_is_idempotent() {
        let store = MemoryOrderStore::new();
        let first = completed_order(&store, "a", 0).await;

        let again = verify_and_complete(
            &store,
            &SignatureScheme::razorpay(),
            SECRET,
            &confirmation("gw_a", "pay_1"),
        )
        .await
        .unwrap();
        assert!(!again.newly_completed);
        assert_eq!(again.order.download_token, first.download_token);
    }

    #[tokio::test]
    async fn test_verify_unknown_order() {
        let store = MemoryOrderStore::new();
        let err = verify_and_complete(
            &store,
            &SignatureScheme::razorpay(),
            SECRET,
            &confirmation("gw_missing", "pay_1"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_redeem_returns_exact_data_and_counts() {
        let store = MemoryOrderStore::new();
        let order = completed_order(&store, "a", 0).await;

        let first = redeem(&store, &order.download_token, 10).await.unwrap();
        assert_eq!(first.resume_data, new_order("a", "x").resume_data);
        assert_eq!(first.template_id, "modern");
        assert_eq!(first.download_count, 0);

        let second = redeem(&store, &order.download_token, 20).await.unwrap();
        assert_eq!(second.download_count, 1);
        assert_eq!(second.resume_data, first.resume_data);
    }

    #[tokio::test]
    async fn test_redeem_pending_is_forbidden() {
        let store = MemoryOrderStore::new();
        let order = create_order(&store, new_order("a", "ada@example.com"), 365, 0)
            .await
            .unwrap();
        let err = redeem(&store, &order.download_token, 0).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_redeem_after_expiry() {
        let store = MemoryOrderStore::new();
        let order = completed_order(&store, "a", 0).await;

        // Still valid on the last millisecond.
        assert!(redeem(&store, &order.download_token, order.expires_at)
            .await
            .is_ok());

        let err = redeem(&store, &order.download_token, order.expires_at + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Expired(_)));
    }

    #[tokio::test]
    async fn test_redeem_unknown_token() {
        let store = MemoryOrderStore::new();
        let err = redeem(&store, "nope", 0).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resend_picks_latest_redeemable_order() {
        let store = MemoryOrderStore::new();
        completed_order(&store, "old", 100).await;
        let newest = completed_order(&store, "new", 200).await;
        // Newer still, but never paid.
        create_order(&store, new_order("pending", "ada@example.com"), 365, 300)
            .await
            .unwrap();

        let target = find_resend_target(&store, "ada@example.com", 400)
            .await
            .unwrap();
        assert_eq!(target.id, newest.id);
    }

    #[tokio::test]
    async fn test_resend_ignores_expired_orders() {
        let store = MemoryOrderStore::new();
        let order = completed_order(&store, "a", 0).await;

        let err = find_resend_target(&store, "ada@example.com", order.expires_at + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(find_resend_target(&store, "nobody@example.com", 0)
            .await
            .is_err());
    }
}
