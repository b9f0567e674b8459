//! Checkout Data

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::domain::{
    orders::records::OrderUuid, payments::records::PaymentUuid, products::records::ProductUuid,
    shipping::data::DeliveryAddress,
};

/// Exclusive upper bound on gateway order codes (`2^53`, the largest integer a JSON number
/// carries exactly).
pub const ORDER_CODE_LIMIT: i64 = 1 << 53;

/// A product and quantity chosen for purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedItem {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

/// Cart checkout into an order without payment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutOrder {
    pub items: Vec<SelectedItem>,
    pub note: String,

    /// Used when it names a known order status; otherwise the order starts `PENDING`.
    pub status: Option<String>,
}

/// Pay for lines already in the buyer's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartPayment {
    pub items: Vec<SelectedItem>,
    pub note: String,
    pub address: DeliveryAddress,
}

/// Pay for one product without touching the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectPayment {
    pub item: SelectedItem,
    pub note: String,
    pub address: DeliveryAddress,
}

/// Bases the gateway calls back on; the payment id and signature are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackUrls {
    pub success: String,
    pub cancel: String,
}

/// A pending payment and where the buyer completes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub checkout_url: String,
    pub order_uuid: OrderUuid,
    pub payment_uuid: PaymentUuid,
    pub order_code: i64,
}

/// Fold repeated products into one entry, keeping first-seen order.
#[must_use]
pub fn merge_selected(items: &[SelectedItem]) -> Option<Vec<SelectedItem>> {
    let mut merged: Vec<SelectedItem> = Vec::with_capacity(items.len());
    let mut positions: FxHashMap<ProductUuid, usize> = FxHashMap::default();

    for item in items {
        match positions.get(&item.product_uuid) {
            Some(&index) => {
                let entry = merged.get_mut(index)?;

                entry.quantity = entry.quantity.checked_add(item.quantity)?;
            }
            None => {
                positions.insert(item.product_uuid, merged.len());
                merged.push(*item);
            }
        }
    }

    Some(merged)
}

/// Random positive order code below [`ORDER_CODE_LIMIT`].
#[must_use]
pub fn generate_order_code() -> i64 {
    rand::thread_rng().gen_range(1..ORDER_CODE_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: ProductUuid, quantity: u32) -> SelectedItem {
        SelectedItem {
            product_uuid: product,
            quantity,
        }
    }

    #[test]
    fn merge_combines_repeats_in_first_seen_order() {
        let first = ProductUuid::new();
        let second = ProductUuid::new();

        let merged = merge_selected(&[item(first, 1), item(second, 2), item(first, 3)]);

        assert_eq!(merged, Some(vec![item(first, 4), item(second, 2)]));
    }

    #[test]
    fn merge_rejects_overflowing_quantities() {
        let product = ProductUuid::new();

        assert_eq!(
            merge_selected(&[item(product, u32::MAX), item(product, 1)]),
            None
        );
    }

    #[test]
    fn order_codes_stay_in_gateway_range() {
        for _ in 0..1000 {
            let code = generate_order_code();

            assert!((1..ORDER_CODE_LIMIT).contains(&code), "{code} out of range");
        }
    }
}
