//! Payment Data

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use thiserror::Error;

use crate::{
    domain::{orders::records::OrderUuid, payments::records::PaymentUuid},
    identity::UserUuid,
};

/// Payment lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Initiated,
    Pending,
    Authorized,
    Captured,
    Paid,
    Failed,
    Cancelled,
    Refunded,
    Chargeback,
    Expired,
}

impl PaymentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initiated => "INITIATED",
            Self::Pending => "PENDING",
            Self::Authorized => "AUTHORIZED",
            Self::Captured => "CAPTURED",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Refunded => "REFUNDED",
            Self::Chargeback => "CHARGEBACK",
            Self::Expired => "EXPIRED",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment status: {0}")]
pub struct UnknownPaymentStatus(pub String);

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INITIATED" => Ok(Self::Initiated),
            "PENDING" => Ok(Self::Pending),
            "AUTHORIZED" => Ok(Self::Authorized),
            "CAPTURED" => Ok(Self::Captured),
            "PAID" => Ok(Self::Paid),
            "FAILED" => Ok(Self::Failed),
            "CANCELLED" => Ok(Self::Cancelled),
            "REFUNDED" => Ok(Self::Refunded),
            "CHARGEBACK" => Ok(Self::Chargeback),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(UnknownPaymentStatus(s.to_string())),
        }
    }
}

/// New Payment Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub uuid: PaymentUuid,
    pub user_uuid: UserUuid,
    pub order_uuid: OrderUuid,

    /// Gateway-side reference; the order code for hosted checkouts.
    pub transaction_id: String,
    pub amount: u64,
    pub currency: String,
    pub status: PaymentStatus,
    pub method: String,
}

/// Payment Update Data
///
/// `None` keeps the stored value. Amount, order and gateway reference are fixed once created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub currency: Option<String>,
    pub method: Option<String>,
    pub status: Option<String>,
}

/// Narrows a payment listing; unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub user_uuid: Option<UserUuid>,
    pub status: Option<PaymentStatus>,
}
