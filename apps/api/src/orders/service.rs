use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use tracing::{error, info};

use crate::errors::AppError;
use crate::gateway::{GatewayOrderRequest, OrderNotes, PaymentGateway};
use crate::mailer::templates::{download_url, DEFAULT_TEMPLATE_NAME};
use crate::mailer::{DownloadLinkEmail, Mailer};
use crate::models::order::Order;
use crate::models::resume::is_blank;
use crate::orders::lifecycle::{self, NewOrder, PaymentConfirmation, Redemption};
use crate::orders::signature::SignatureScheme;
use crate::orders::store::OrderStore;
use crate::orders::token::generate_receipt_id;

#[derive(Debug, Clone)]
pub struct OrderSettings {
    pub amount: i64,
    pub currency: String,
    pub validity_days: i64,
    /// Public key id handed to the checkout widget.
    pub key_id: String,
    pub key_secret: String,
    pub signature_scheme: SignatureScheme,
    pub frontend_url: String,
}

#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub email: String,
    pub resume_data: String,
    pub template_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutDetails {
    pub gateway_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

/// Coordinates the order lifecycle with the payment gateway and the mailer.
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    mailer: Arc<dyn Mailer>,
    settings: OrderSettings,
}

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Trims and lowercases, then checks the `local@domain.tld` shape.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(email)
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
        settings: OrderSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            mailer,
            settings,
        }
    }

    pub async fn create_order(&self, input: CreateOrderInput) -> Result<CheckoutDetails, AppError> {
        let email = normalize_email(&input.email)?;
        if is_blank(Some(&input.resume_data)) {
            return Err(AppError::Validation("Resume data is required".to_string()));
        }
        if is_blank(Some(&input.template_id)) {
            return Err(AppError::Validation("Template ID is required".to_string()));
        }

        let receipt = generate_receipt_id();
        let gateway_order = self
            .gateway
            .create_order(&GatewayOrderRequest {
                amount: self.settings.amount,
                currency: self.settings.currency.clone(),
                receipt: receipt.clone(),
                notes: OrderNotes {
                    email: email.clone(),
                    template_id: input.template_id.clone(),
                },
            })
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        let order = lifecycle::create_order(
            self.store.as_ref(),
            NewOrder {
                id: receipt,
                email,
                resume_data: input.resume_data,
                template_id: input.template_id,
                amount: self.settings.amount,
                currency: self.settings.currency.clone(),
                gateway_order_id: gateway_order.id,
            },
            self.settings.validity_days,
            Utc::now().timestamp_millis(),
        )
        .await?;

        Ok(CheckoutDetails {
            gateway_order_id: order.gateway_order_id,
            amount: order.amount,
            currency: order.currency,
            key_id: self.settings.key_id.clone(),
        })
    }

    /// Verifies the callback signature and returns the completed order.
    /// The download link is emailed only on the first successful completion.
    pub async fn verify_payment(
        &self,
        confirmation: PaymentConfirmation,
        template_name: Option<String>,
    ) -> Result<Order, AppError> {
        let completion = lifecycle::verify_and_complete(
            self.store.as_ref(),
            &self.settings.signature_scheme,
            &self.settings.key_secret,
            &confirmation,
        )
        .await?;

        if completion.newly_completed {
            let email = self.download_link_email(&completion.order, template_name);
            if let Err(e) = self.mailer.send_download_link(&email).await {
                error!(
                    order_id = %completion.order.id,
                    error = %e,
                    "Download link email failed; payment stays completed"
                );
            }
        }

        Ok(completion.order)
    }

    pub async fn redeem(&self, token: &str) -> Result<Redemption, AppError> {
        lifecycle::redeem(self.store.as_ref(), token, Utc::now().timestamp_millis()).await
    }

    pub async fn resend_link(
        &self,
        email: &str,
        template_name: Option<String>,
    ) -> Result<(), AppError> {
        let email = normalize_email(email)?;
        let order = lifecycle::find_resend_target(
            self.store.as_ref(),
            &email,
            Utc::now().timestamp_millis(),
        )
        .await?;

        let message = self.download_link_email(&order, template_name);
        self.mailer
            .send_download_link(&message)
            .await
            .map_err(|e| AppError::Mailer(e.to_string()))?;

        info!(order_id = %order.id, "Download link resent");
        Ok(())
    }

    fn download_link_email(&self, order: &Order, template_name: Option<String>) -> DownloadLinkEmail {
        DownloadLinkEmail {
            to: order.email.clone(),
            download_url: download_url(&self.settings.frontend_url, &order.download_token),
            template_name: template_name
                .filter(|name| !is_blank(Some(name)))
                .unwrap_or_else(|| DEFAULT_TEMPLATE_NAME.to_string()),
            validity_days: self.settings.validity_days,
        }
    }
}
