//! Mailer that only logs, for environments without a relay.

use async_trait::async_trait;
use tracing::info;

use super::{MailMessage, Mailer, MailerError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailerError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            template = %message.template_path,
            data = %message.data,
            "mail not sent; no relay configured"
        );

        Ok(())
    }
}
