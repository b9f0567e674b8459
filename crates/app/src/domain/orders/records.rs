//! Order Records

use jiff::Timestamp;

use crate::{
    domain::{line_items::LineItem, orders::data::OrderStatus},
    identity::UserUuid,
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,

    /// Point-in-time snapshot; never rewritten after creation.
    pub items: Vec<LineItem>,

    /// Sum of line totals in minor currency units.
    pub total_amount: u64,
    pub currency: String,
    pub status: OrderStatus,
    pub note: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
