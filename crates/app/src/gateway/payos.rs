//! payOS hosted checkout client.

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use super::{CheckoutLink, CheckoutSession, GatewayError, GatewayItem, PAYOS_METHOD, PaymentGateway};

const SUCCESS_CODE: &str = "00";

/// Configuration for connecting to payOS.
#[derive(Debug, Clone)]
pub struct PayOsConfig {
    /// API base address, e.g. `"https://api-merchant.payos.vn"`.
    pub api_url: String,

    pub client_id: String,
    pub api_key: Zeroizing<String>,

    /// Key used to sign checkout requests.
    pub checksum_key: Zeroizing<String>,

    /// Upper bound on a single gateway call.
    pub timeout: Duration,
}

/// HTTP client for payOS payment requests.
#[derive(Debug, Clone)]
pub struct PayOsClient {
    config: PayOsConfig,
    http: Client,
}

impl PayOsClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: PayOsConfig) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    /// Signature over the sorted `key=value` pairs payOS checks on payment requests.
    fn sign(&self, session: &CheckoutSession) -> Result<String, GatewayError> {
        let data = signing_payload(session);

        let mut mac = Hmac::<Sha256>::new_from_slice(self.config.checksum_key.as_bytes())
            .map_err(|_invalid| GatewayError::InvalidKey)?;

        mac.update(data.as_bytes());

        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl PaymentGateway for PayOsClient {
    fn method(&self) -> &'static str {
        PAYOS_METHOD
    }

    #[tracing::instrument(
        name = "gateway.payos.create_checkout_session",
        skip(self, session),
        fields(order_code = session.order_code, amount = session.amount),
        err
    )]
    async fn create_checkout_session(
        &self,
        session: CheckoutSession,
    ) -> Result<CheckoutLink, GatewayError> {
        let url = format!("{}/v2/payment-requests", self.config.api_url);

        let signature = self.sign(&session)?;

        let body = PaymentRequest {
            order_code: session.order_code,
            amount: session.amount,
            description: &session.description,
            items: &session.items,
            return_url: &session.return_url,
            cancel_url: &session.cancel_url,
            signature,
        };

        let response = self
            .http
            .post(&url)
            .header("x-client-id", &self.config.client_id)
            .header("x-api-key", self.config.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(GatewayError::UnexpectedResponse(format!(
                "payment request failed with status {status}: {text}"
            )));
        }

        let parsed: PaymentResponse = response.json().await?;

        if parsed.code != SUCCESS_CODE {
            return Err(GatewayError::Rejected {
                code: parsed.code,
                desc: parsed.desc,
            });
        }

        let data = parsed.data.ok_or_else(|| {
            GatewayError::UnexpectedResponse("payment response carried no data".to_string())
        })?;

        debug!(order_code = session.order_code, "opened checkout session");

        Ok(CheckoutLink {
            checkout_url: data.checkout_url,
        })
    }
}

fn signing_payload(session: &CheckoutSession) -> String {
    format!(
        "amount={}&cancelUrl={}&description={}&orderCode={}&returnUrl={}",
        session.amount,
        session.cancel_url,
        session.description,
        session.order_code,
        session.return_url
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequest<'a> {
    order_code: i64,
    amount: u64,
    description: &'a str,
    items: &'a [GatewayItem],
    return_url: &'a str,
    cancel_url: &'a str,
    signature: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    code: String,
    desc: String,
    data: Option<PaymentData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentData {
    checkout_url: String,
}
