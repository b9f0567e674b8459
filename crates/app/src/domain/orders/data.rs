//! Order Data

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use thiserror::Error;

use crate::{
    domain::{line_items::LineItem, orders::records::OrderUuid},
    identity::UserUuid,
};

/// Currency used when a flow does not name one.
pub const DEFAULT_CURRENCY: &str = "VND";

/// Order lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    Failed,
    Refunded,
    Returned,
}

impl OrderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
            Self::Returned => "RETURNED",
        }
    }

    /// The requested status when it is a known one, `PENDING` otherwise.
    #[must_use]
    pub fn requested_or_pending(requested: Option<&str>) -> Self {
        requested
            .and_then(|status| status.parse().ok())
            .unwrap_or(Self::Pending)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "PROCESSING" => Ok(Self::Processing),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            "FAILED" => Ok(Self::Failed),
            "REFUNDED" => Ok(Self::Refunded),
            "RETURNED" => Ok(Self::Returned),
            _ => Err(UnknownOrderStatus(s.to_string())),
        }
    }
}

/// New Order Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub items: Vec<LineItem>,
    pub total_amount: u64,
    pub currency: String,
    pub status: OrderStatus,
    pub note: String,
}

/// Order Update Data
///
/// `None` keeps the stored value. The status is checked against [`OrderStatus`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub currency: Option<String>,
    pub status: Option<String>,
    pub note: Option<String>,
}

/// Narrows an order listing; unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub user_uuid: Option<UserUuid>,
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses_case_insensitively() {
        assert_eq!("confirmed".parse(), Ok(OrderStatus::Confirmed));
        assert_eq!(" RETURNED ".parse(), Ok(OrderStatus::Returned));
        assert_eq!(
            "ON_HOLD".parse::<OrderStatus>(),
            Err(UnknownOrderStatus("ON_HOLD".to_string()))
        );
    }

    #[test]
    fn unknown_requested_status_falls_back_to_pending() {
        assert_eq!(
            OrderStatus::requested_or_pending(Some("SHIPPED")),
            OrderStatus::Shipped
        );
        assert_eq!(
            OrderStatus::requested_or_pending(Some("bogus")),
            OrderStatus::Pending
        );
        assert_eq!(OrderStatus::requested_or_pending(None), OrderStatus::Pending);
    }

    #[test]
    fn display_matches_stored_form() {
        assert_eq!(OrderStatus::Cancelled.to_string(), "CANCELLED");
        assert_eq!(
            OrderStatus::Cancelled.as_str().parse(),
            Ok(OrderStatus::Cancelled)
        );
    }
}
