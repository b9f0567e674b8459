//! Cart Data

use crate::domain::products::records::ProductUuid;

/// Number of days a cart lives after its last change.
pub const CART_TTL_DAYS: i64 = 7;

/// A product and quantity to put into a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItemRequest {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}
