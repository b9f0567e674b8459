//! Inventory Data

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::civil::Date;
use thiserror::Error;

use crate::domain::{inventory::records::InventoryTransactionUuid, products::records::ProductUuid};

/// Business reason for a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InventoryAction {
    Sale,
    Import,
    Export,
    Return,
    Cancel,
}

impl InventoryAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Import => "import",
            Self::Export => "export",
            Self::Return => "return",
            Self::Cancel => "cancel",
        }
    }

    /// Whether applying this action takes units out of stock.
    pub const fn reduces_stock(self) -> bool {
        matches!(self, Self::Sale | Self::Export)
    }

    /// Stock delta for `amount` units of this action.
    #[must_use]
    pub fn signed_amount(self, amount: u32) -> i64 {
        let amount = i64::from(amount);

        if self.reduces_stock() { -amount } else { amount }
    }

    /// Stock delta that undoes a previously applied entry of this action.
    #[must_use]
    pub fn reverse_sign(self, amount: u32) -> i64 {
        -self.signed_amount(amount)
    }
}

impl Display for InventoryAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown inventory action: {0}")]
pub struct UnknownInventoryAction(pub String);

impl FromStr for InventoryAction {
    type Err = UnknownInventoryAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" => Ok(Self::Sale),
            "import" => Ok(Self::Import),
            "export" => Ok(Self::Export),
            "return" => Ok(Self::Return),
            "cancel" => Ok(Self::Cancel),
            _ => Err(UnknownInventoryAction(s.to_string())),
        }
    }
}

/// New Inventory Transaction Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInventoryTransaction {
    pub uuid: InventoryTransactionUuid,
    pub product_uuid: ProductUuid,
    pub action: InventoryAction,
    pub amount: u32,
    pub note: String,
    pub business_date: Date,
}

/// Inventory Transaction Update Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryTransactionUpdate {
    pub product_uuid: ProductUuid,
    pub action: InventoryAction,
    pub amount: u32,

    /// Keeps the existing note when `None`.
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [InventoryAction; 5] = [
        InventoryAction::Sale,
        InventoryAction::Import,
        InventoryAction::Export,
        InventoryAction::Return,
        InventoryAction::Cancel,
    ];

    #[test]
    fn sale_and_export_reduce_stock() {
        assert_eq!(InventoryAction::Sale.signed_amount(5), -5);
        assert_eq!(InventoryAction::Export.signed_amount(4), -4);
        assert_eq!(InventoryAction::Import.signed_amount(10), 10);
        assert_eq!(InventoryAction::Return.signed_amount(2), 2);
        assert_eq!(InventoryAction::Cancel.signed_amount(3), 3);
    }

    #[test]
    fn reverse_sign_undoes_the_original_application() {
        assert_eq!(InventoryAction::Sale.reverse_sign(5), 5);
        assert_eq!(InventoryAction::Export.reverse_sign(4), 4);
        assert_eq!(InventoryAction::Import.reverse_sign(10), -10);

        for action in ALL {
            assert_eq!(
                action.signed_amount(7) + action.reverse_sign(7),
                0,
                "{action} reversal must cancel its application"
            );
        }
    }

    #[test]
    fn editing_an_import_into_an_export_removes_both() {
        let start = 30_i64;

        let after = start
            + InventoryAction::Import.reverse_sign(10)
            + InventoryAction::Export.signed_amount(4);

        assert_eq!(after, start - 10 - 4);
    }

    #[test]
    fn actions_parse_case_insensitively() {
        for action in ALL {
            assert_eq!(action.as_str().parse::<InventoryAction>(), Ok(action));
            assert_eq!(
                action.as_str().to_uppercase().parse::<InventoryAction>(),
                Ok(action)
            );
        }

        assert!("restock".parse::<InventoryAction>().is_err());
    }
}
