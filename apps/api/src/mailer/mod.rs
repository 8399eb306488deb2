pub mod templates;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SES send failed: {0}")]
    Send(String),
}

/// A download-link notification for one completed order.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadLinkEmail {
    pub to: String,
    pub download_url: String,
    pub template_name: String,
    pub validity_days: i64,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_download_link(&self, email: &DownloadLinkEmail) -> Result<(), MailerError>;
}

/// Writes the message to the log instead of delivering it. Used when no SES
/// region is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_download_link(&self, email: &DownloadLinkEmail) -> Result<(), MailerError> {
        info!(
            to = %email.to,
            template = %email.template_name,
            "Email delivery disabled; download link email not sent"
        );
        Ok(())
    }
}

pub struct SesMailer {
    client: SesClient,
    from: String,
}

impl SesMailer {
    pub async fn from_region(region: String, from: String) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;

        Self {
            client: SesClient::new(&config),
            from,
        }
    }
}

fn utf8_content(data: String) -> Result<Content, MailerError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| MailerError::Build(e.to_string()))
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send_download_link(&self, email: &DownloadLinkEmail) -> Result<(), MailerError> {
        let destination = Destination::builder()
            .to_addresses(email.to.clone())
            .build();

        let body = Body::builder()
            .html(utf8_content(templates::render_html(email))?)
            .text(utf8_content(templates::render_text(email))?)
            .build();

        let message = Message::builder()
            .subject(utf8_content(templates::DOWNLOAD_LINK_SUBJECT.to_string())?)
            .body(body)
            .build();

        let result = self
            .client
            .send_email()
            .from_email_address(&self.from)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| {
                let detail = DisplayErrorContext(&e).to_string();
                error!(to = %email.to, error = %detail, "Failed to send email via SES");
                MailerError::Send(detail)
            })?;

        info!(
            to = %email.to,
            message_id = ?result.message_id(),
            "Download link email sent"
        );
        Ok(())
    }
}
