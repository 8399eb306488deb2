use std::str::FromStr;

use anyhow::{Context, Result};

use crate::gateway::DEFAULT_API_URL;
use crate::orders::signature::SignatureScheme;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub razorpay_api_url: String,
    pub signature_scheme: SignatureScheme,
    /// Minor currency units.
    pub payment_amount: i64,
    pub payment_currency: String,
    pub download_link_validity_days: i64,
    pub frontend_url: String,
    pub email_from: String,
    /// `None` disables outbound email.
    pub ses_region: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let payment_amount: i64 = parse(&or_default("PAYMENT_AMOUNT", "4900"), "PAYMENT_AMOUNT")?;
        if payment_amount <= 0 {
            anyhow::bail!("PAYMENT_AMOUNT must be a positive number of minor units");
        }

        let download_link_validity_days: i64 = parse(
            &or_default("DOWNLOAD_LINK_VALIDITY_DAYS", "365"),
            "DOWNLOAD_LINK_VALIDITY_DAYS",
        )?;
        if download_link_validity_days <= 0 {
            anyhow::bail!("DOWNLOAD_LINK_VALIDITY_DAYS must be positive");
        }

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            razorpay_key_id: require("RAZORPAY_KEY_ID")?,
            razorpay_key_secret: require("RAZORPAY_KEY_SECRET")?,
            razorpay_api_url: or_default("RAZORPAY_API_URL", DEFAULT_API_URL),
            signature_scheme: or_default("PAYMENT_SIGNATURE_SCHEME", "razorpay")
                .parse()
                .context("PAYMENT_SIGNATURE_SCHEME is not a supported scheme")?,
            payment_amount,
            payment_currency: or_default("PAYMENT_CURRENCY", "INR"),
            download_link_validity_days,
            frontend_url: or_default("FRONTEND_URL", "http://localhost:3000"),
            email_from: or_default("EMAIL_FROM", "ResumePro <noreply@resumepro.com>"),
            ses_region: lookup("SES_REGION").filter(|v| !v.trim().is_empty()),
            port: parse(&or_default("PORT", "5000"), "PORT")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}

fn parse<T>(value: &str, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{value}'"))
}
