//! Payment Callback Config

use clap::Args;

use crate::domain::{checkout::data::CallbackUrls, settlement::data::RedirectUrls};

/// Where the gateway and the buyer are sent once a checkout ends.
#[derive(Debug, Args)]
pub struct CallbackConfig {
    /// Gateway-facing success callback; the payment id is appended
    #[arg(long, env = "PAYMENT_CALLBACK_SUCCESS_PROCESS")]
    pub success_process_url: String,

    /// Gateway-facing cancel callback; the payment id is appended
    #[arg(long, env = "PAYMENT_CALLBACK_CANCEL_PROCESS")]
    pub cancel_process_url: String,

    /// Buyer page shown after a successful payment
    #[arg(long, env = "PAYMENT_CALLBACK_SUCCESS")]
    pub success_redirect_url: String,

    /// Buyer page shown after a cancelled payment
    #[arg(long, env = "PAYMENT_CALLBACK_CANCEL")]
    pub cancel_redirect_url: String,

    /// Shared secret callback URLs are signed with
    #[arg(long, env = "PAYMENT_CALLBACK_SECRET", hide_env_values = true)]
    pub callback_secret: String,
}

impl CallbackConfig {
    #[must_use]
    pub fn process_urls(&self) -> CallbackUrls {
        CallbackUrls {
            success: self.success_process_url.clone(),
            cancel: self.cancel_process_url.clone(),
        }
    }

    #[must_use]
    pub fn redirect_urls(&self) -> RedirectUrls {
        RedirectUrls {
            success: self.success_redirect_url.clone(),
            cancel: self.cancel_redirect_url.clone(),
        }
    }
}
