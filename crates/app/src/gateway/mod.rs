//! Hosted-checkout payment gateway.

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use smallvec::SmallVec;
use thiserror::Error;

mod payos;
mod signature;

pub use payos::{PayOsClient, PayOsConfig};
pub use signature::{CallbackOutcome, CallbackSigner};

/// Method name persisted on payments created through the hosted checkout.
pub const PAYOS_METHOD: &str = "PAYOS";

/// A line shown on the gateway's checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayItem {
    pub name: String,
    pub quantity: u32,
    pub price: u64,
}

/// Everything the gateway needs to open a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub order_code: i64,

    /// Total in minor currency units.
    pub amount: u64,
    pub description: String,
    pub items: SmallVec<[GatewayItem; 4]>,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLink {
    pub checkout_url: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway rejected checkout with code {code}: {desc}")]
    Rejected { code: String, desc: String },

    #[error("unexpected response from gateway: {0}")]
    UnexpectedResponse(String),

    #[error("invalid gateway signing key")]
    InvalidKey,
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Payment method recorded for sessions opened through this gateway.
    fn method(&self) -> &'static str;

    /// Open a hosted checkout session and return the buyer-facing URL.
    async fn create_checkout_session(
        &self,
        session: CheckoutSession,
    ) -> Result<CheckoutLink, GatewayError>;
}
