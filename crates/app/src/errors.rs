//! User-facing error messages shared by the domain services.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Message shown for store, gateway and other internal failures.
pub const INTERNAL_MESSAGE: &str =
    "There is something wrong in the system during the process. Please try again later.";

/// Message shown for malformed or missing input.
pub const INVALID_DATA_MESSAGE: &str = "Invalid data. Please try again.";

/// Message shown when the actor lacks rights.
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";

/// Message shown for duplicates and invalid state transitions.
pub const CONFLICT_MESSAGE: &str = "This data conflicts with its current state. Please try again.";

/// Entities that can be reported as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Product,
    Inventory,
    InventoryTransaction,
    Cart,
    CartItem,
    Order,
    Payment,
    Shipping,
}

impl Entity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Product => "Product",
            Self::Inventory => "Product inventory",
            Self::InventoryTransaction => "Inventory transaction",
            Self::Cart => "Cart",
            Self::CartItem => "Cart item",
            Self::Order => "Order",
            Self::Payment => "Payment",
            Self::Shipping => "Shipping",
        }
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Service errors that can report a missing entity.
pub(crate) trait EntityError: From<sqlx::Error> {
    fn not_found(entity: Entity) -> Self;

    /// Maps `RowNotFound` to [`EntityError::not_found`] for `entity`, anything else through
    /// the usual store error classification.
    fn missing(entity: Entity) -> impl FnOnce(sqlx::Error) -> Self {
        move |error| match error {
            sqlx::Error::RowNotFound => Self::not_found(entity),
            error => Self::from(error),
        }
    }
}

/// `"<Entity> not found."`
#[must_use]
pub fn not_found_message(entity: Entity) -> String {
    format!("{entity} not found.")
}

/// Out-of-stock message embedding the attempted quantity.
#[must_use]
pub fn out_of_stock_message(requested: u32) -> String {
    format!("This product is out of stock with {requested} items added to cart.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_is_templated_per_entity() {
        assert_eq!(not_found_message(Entity::Cart), "Cart not found.");
        assert_eq!(
            not_found_message(Entity::Inventory),
            "Product inventory not found."
        );
    }

    #[test]
    fn out_of_stock_message_embeds_quantity() {
        assert_eq!(
            out_of_stock_message(7),
            "This product is out of stock with 7 items added to cart."
        );
    }
}
