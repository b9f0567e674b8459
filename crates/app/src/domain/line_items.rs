//! Line items shared by carts and order snapshots.
//!
//! Both are persisted as a JSON array of
//! `{productId, name, imageUrl, quantity, price, currency}`.

use serde::{Deserialize, Serialize};

use crate::domain::products::records::{ProductRecord, ProductUuid};

/// One product line with the catalog data captured when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductUuid,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,

    /// Unit price in minor currency units.
    pub price: u64,
    pub currency: String,
}

impl LineItem {
    /// Snapshot a product's catalog data for the given quantity.
    #[must_use]
    pub fn from_product(product: &ProductRecord, quantity: u32) -> Self {
        Self {
            product_id: product.uuid,
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            quantity,
            price: product.price,
            currency: product.currency.clone(),
        }
    }

    /// `price * quantity`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.price.checked_mul(u64::from(self.quantity))
    }
}

/// Sum of all line totals, or `None` on overflow.
#[must_use]
pub fn total_amount(lines: &[LineItem]) -> Option<u64> {
    lines
        .iter()
        .try_fold(0_u64, |acc, line| acc.checked_add(line.line_total()?))
}

pub(crate) fn find_line(lines: &[LineItem], product: ProductUuid) -> Option<&LineItem> {
    lines.iter().find(|line| line.product_id == product)
}

pub(crate) fn find_line_mut(lines: &mut [LineItem], product: ProductUuid) -> Option<&mut LineItem> {
    lines.iter_mut().find(|line| line.product_id == product)
}

/// Reduce the product's line by `quantity`, dropping it once nothing is left.
///
/// Returns `false` when the product has no line.
pub(crate) fn take_quantity(lines: &mut Vec<LineItem>, product: ProductUuid, quantity: u32) -> bool {
    let Some(position) = lines.iter().position(|line| line.product_id == product) else {
        return false;
    };

    let exhausted = lines.get_mut(position).is_some_and(|line| {
        line.quantity = line.quantity.saturating_sub(quantity);
        line.quantity == 0
    });

    if exhausted {
        lines.remove(position);
    }

    true
}

/// Remove the product's line entirely. Returns `false` when absent.
pub(crate) fn remove_line(lines: &mut Vec<LineItem>, product: ProductUuid) -> bool {
    let before = lines.len();

    lines.retain(|line| line.product_id != product);

    lines.len() != before
}
