//! Mail Config

use clap::Args;
use zeroize::Zeroizing;

use crate::mailer::HttpMailerConfig;

/// Mail relay settings. Without a relay URL mail is only logged.
#[derive(Debug, Args)]
pub struct MailConfig {
    #[arg(long, env = "MAIL_API_URL")]
    pub mail_api_url: Option<String>,

    #[arg(long, env = "MAIL_API_KEY", hide_env_values = true, default_value = "")]
    pub mail_api_key: String,

    /// `From` address
    #[arg(long, env = "MAIL_SENDER", default_value = "no-reply@sonit.vn")]
    pub mail_sender: String,
}

impl MailConfig {
    /// Relay settings, when a relay is configured.
    #[must_use]
    pub fn relay(&self) -> Option<HttpMailerConfig> {
        self.mail_api_url.as_ref().map(|api_url| HttpMailerConfig {
            api_url: api_url.clone(),
            api_key: Zeroizing::new(self.mail_api_key.clone()),
            sender: self.mail_sender.clone(),
        })
    }
}
