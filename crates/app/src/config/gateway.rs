//! Payment Gateway Config

use std::time::Duration;

use clap::Args;
use zeroize::Zeroizing;

use crate::gateway::PayOsConfig;

/// payOS credentials and limits.
#[derive(Debug, Args)]
pub struct GatewayConfig {
    /// payOS API base address
    #[arg(long, env = "PAYOS_API_URL", default_value = "https://api-merchant.payos.vn")]
    pub payos_api_url: String,

    #[arg(long, env = "PAYOS_CLIENT_ID")]
    pub payos_client_id: String,

    #[arg(long, env = "PAYOS_API_KEY", hide_env_values = true)]
    pub payos_api_key: String,

    /// Key payment requests are signed with
    #[arg(long, env = "PAYOS_CHECKSUM_KEY", hide_env_values = true)]
    pub payos_checksum_key: String,

    /// Upper bound on a single gateway call, in seconds.
    ///
    /// Checkout holds its inventory row locks for the length of this call.
    #[arg(long, env = "PAYOS_TIMEOUT_SECONDS", default_value_t = 10)]
    pub payos_timeout_seconds: u64,
}

impl GatewayConfig {
    #[must_use]
    pub fn payos(&self) -> PayOsConfig {
        PayOsConfig {
            api_url: self.payos_api_url.clone(),
            client_id: self.payos_client_id.clone(),
            api_key: Zeroizing::new(self.payos_api_key.clone()),
            checksum_key: Zeroizing::new(self.payos_checksum_key.clone()),
            timeout: Duration::from_secs(self.payos_timeout_seconds),
        }
    }
}
