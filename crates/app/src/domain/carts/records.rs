//! Cart Records

use jiff::Timestamp;

use crate::{domain::line_items::LineItem, identity::UserUuid};

/// Cart Record
///
/// One per user, keyed by the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRecord {
    pub user_uuid: UserUuid,

    /// At most one line per product, each with a positive quantity.
    pub items: Vec<LineItem>,
    pub expired_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
