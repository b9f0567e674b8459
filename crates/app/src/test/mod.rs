//! Service-level test harness.

pub(crate) mod helpers;

pub(crate) use context::TestContext;

/// Gateway-facing callback bases handed out in test checkouts.
pub(crate) const CALLBACK_SUCCESS_PROCESS_URL: &str = "https://api.sonit.test/payments/success/";
pub(crate) const CALLBACK_CANCEL_PROCESS_URL: &str = "https://api.sonit.test/payments/cancel/";

/// Buyer-facing pages settlement redirects to.
pub(crate) const CALLBACK_SUCCESS_REDIRECT_URL: &str = "https://shop.sonit.test/payment/success/";
pub(crate) const CALLBACK_CANCEL_REDIRECT_URL: &str = "https://shop.sonit.test/payment/cancel/";

pub(crate) const CALLBACK_SECRET: &str = "sonit-test-callback-secret";
