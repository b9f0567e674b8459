//! Outbound buyer notifications.

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use thiserror::Error;

mod http;
mod tracing_mailer;

pub use http::{HttpMailer, HttpMailerConfig};
pub use tracing_mailer::TracingMailer;

/// Subject line for payment outcome mails.
pub const PAYMENT_MAIL_SUBJECT: &str = "Sonit payment notification";

pub const PAYMENT_SUCCESS_TEMPLATE: &str = "html_template/mail/payment/success.html";
pub const PAYMENT_CANCEL_TEMPLATE: &str = "html_template/mail/payment/cancel.html";

/// A templated mail; rendering happens on the relay side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub template_path: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail relay rejected message: {0}")]
    Rejected(String),
}

#[automock]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailerError>;
}
