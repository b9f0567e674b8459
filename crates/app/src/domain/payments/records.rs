//! Payment Records

use jiff::Timestamp;

use crate::{
    domain::{orders::records::OrderUuid, payments::data::PaymentStatus},
    identity::UserUuid,
    uuids::TypedUuid,
};

/// Payment UUID
pub type PaymentUuid = TypedUuid<PaymentRecord>;

/// Payment Record
///
/// At most one per order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub uuid: PaymentUuid,
    pub user_uuid: UserUuid,
    pub order_uuid: OrderUuid,
    pub transaction_id: String,
    pub amount: u64,
    pub currency: String,
    pub status: PaymentStatus,
    pub method: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
