//! Product Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
///
/// Only the catalog fields the order flows snapshot into line items.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub image_url: String,

    /// Unit price in minor currency units.
    pub price: u64,
    pub currency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
