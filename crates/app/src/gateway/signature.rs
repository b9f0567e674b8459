//! Shared-secret signatures on the callback URLs handed to the gateway.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use hmac::{Hmac, Mac, digest::InvalidLength};
use sha2::Sha256;

use crate::domain::payments::records::PaymentUuid;

type HmacSha256 = Hmac<Sha256>;

/// Which callback the gateway is reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Success,
    Cancel,
}

impl CallbackOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Cancel => "cancel",
        }
    }
}

/// Signs and verifies `<outcome>:<paymentId>` with a server-side secret.
///
/// The signature travels as a `signature` query parameter on the return/cancel URLs, so only
/// URLs this service generated can settle a payment.
#[derive(Clone)]
pub struct CallbackSigner {
    keyed: HmacSha256,
}

impl CallbackSigner {
    /// Key a signer with the shared secret.
    ///
    /// # Errors
    ///
    /// Returns an error when the secret cannot key an HMAC.
    pub fn new(secret: &str) -> Result<Self, InvalidLength> {
        Ok(Self {
            keyed: HmacSha256::new_from_slice(secret.as_bytes())?,
        })
    }

    fn mac(&self, outcome: CallbackOutcome, payment: PaymentUuid) -> HmacSha256 {
        let mut mac = self.keyed.clone();

        mac.update(outcome.as_str().as_bytes());
        mac.update(b":");
        mac.update(payment.to_string().as_bytes());

        mac
    }

    /// Hex signature for the given callback.
    #[must_use]
    pub fn sign(&self, outcome: CallbackOutcome, payment: PaymentUuid) -> String {
        hex::encode(self.mac(outcome, payment).finalize().into_bytes())
    }

    /// Constant-time check of a presented signature.
    #[must_use]
    pub fn verify(&self, outcome: CallbackOutcome, payment: PaymentUuid, signature: &str) -> bool {
        let Ok(presented) = hex::decode(signature) else {
            return false;
        };

        self.mac(outcome, payment).verify_slice(&presented).is_ok()
    }

    /// `<base><paymentId>?signature=<hex>`
    #[must_use]
    pub fn callback_url(&self, base: &str, outcome: CallbackOutcome, payment: PaymentUuid) -> String {
        format!(
            "{base}{payment}?signature={}",
            self.sign(outcome, payment)
        )
    }
}

impl Debug for CallbackSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CallbackSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn signature_round_trips() -> TestResult {
        let signer = CallbackSigner::new("callback-secret")?;
        let payment = PaymentUuid::new();

        let signature = signer.sign(CallbackOutcome::Success, payment);

        assert!(signer.verify(CallbackOutcome::Success, payment, &signature));

        Ok(())
    }

    #[test]
    fn signature_is_bound_to_outcome_and_payment() -> TestResult {
        let signer = CallbackSigner::new("callback-secret")?;
        let payment = PaymentUuid::new();

        let signature = signer.sign(CallbackOutcome::Success, payment);

        assert!(!signer.verify(CallbackOutcome::Cancel, payment, &signature));
        assert!(!signer.verify(CallbackOutcome::Success, PaymentUuid::new(), &signature));

        Ok(())
    }

    #[test]
    fn signature_from_another_secret_is_rejected() -> TestResult {
        let payment = PaymentUuid::new();
        let forged = CallbackSigner::new("guess")?.sign(CallbackOutcome::Cancel, payment);

        assert!(!CallbackSigner::new("callback-secret")?.verify(
            CallbackOutcome::Cancel,
            payment,
            &forged
        ));

        Ok(())
    }

    #[test]
    fn malformed_signature_is_rejected() -> TestResult {
        let signer = CallbackSigner::new("callback-secret")?;

        assert!(!signer.verify(CallbackOutcome::Success, PaymentUuid::new(), "not-hex"));
        assert!(!signer.verify(CallbackOutcome::Success, PaymentUuid::new(), ""));

        Ok(())
    }

    #[test]
    fn callback_url_appends_payment_and_signature() -> TestResult {
        let signer = CallbackSigner::new("callback-secret")?;
        let payment = PaymentUuid::new();

        let url = signer.callback_url(
            "https://api.example.com/payments/callback-success/",
            CallbackOutcome::Success,
            payment,
        );

        assert_eq!(
            url,
            format!(
                "https://api.example.com/payments/callback-success/{payment}?signature={}",
                signer.sign(CallbackOutcome::Success, payment)
            )
        );

        Ok(())
    }
}
