//! Shipping Records

use jiff::Timestamp;

use crate::domain::{orders::records::OrderUuid, shipping::data::ShippingDetail};

/// Shipping Record
///
/// Keyed by its order; removed when the order is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingRecord {
    pub order_uuid: OrderUuid,
    pub delivery_code: String,

    /// Carrier; empty until dispatch.
    pub shipping_unit: String,
    pub detail: ShippingDetail,
    pub delivered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
