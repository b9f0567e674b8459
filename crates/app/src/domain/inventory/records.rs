//! Inventory Records

use jiff::{Timestamp, civil::Date};

use crate::{
    domain::{inventory::data::InventoryAction, products::records::ProductUuid},
    uuids::TypedUuid,
};

/// Product Inventory Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub product_uuid: ProductUuid,

    /// Units on hand; never negative.
    pub quantity: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Inventory Transaction UUID
pub type InventoryTransactionUuid = TypedUuid<InventoryTransactionRecord>;

/// Inventory Transaction Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryTransactionRecord {
    pub uuid: InventoryTransactionUuid,
    pub product_uuid: ProductUuid,

    /// Unsigned; the action decides the direction.
    pub amount: u32,
    pub action: InventoryAction,
    pub note: String,
    pub business_date: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl InventoryTransactionRecord {
    /// The stock movement this entry applied.
    #[must_use]
    pub fn signed_amount(&self) -> i64 {
        self.action.signed_amount(self.amount)
    }
}
