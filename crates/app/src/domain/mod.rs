//! Commerce Domain

pub(crate) mod amounts;
pub mod carts;
pub mod checkout;
pub mod inventory;
pub mod line_items;
pub mod orders;
pub mod pagination;
pub mod payments;
pub mod products;
pub mod settlement;
pub mod shipping;
