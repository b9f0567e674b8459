//! Inventory service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::errors::{
    CONFLICT_MESSAGE, Entity, EntityError, INTERNAL_MESSAGE, INVALID_DATA_MESSAGE, not_found_message,
    out_of_stock_message,
};

#[derive(Debug, Error)]
pub enum InventoryServiceError {
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("insufficient stock for {requested} units")]
    OutOfStock { requested: u32 },

    #[error("invalid data: {0}")]
    ValidationFailed(String),

    #[error("inventory already exists")]
    Conflict,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl InventoryServiceError {
    /// Message safe to show to the caller.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(entity) => not_found_message(*entity),
            Self::OutOfStock { requested } => out_of_stock_message(*requested),
            Self::ValidationFailed(_) => INVALID_DATA_MESSAGE.to_string(),
            Self::Conflict => CONFLICT_MESSAGE.to_string(),
            Self::Sql(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl EntityError for InventoryServiceError {
    fn not_found(entity: Entity) -> Self {
        Self::NotFound(entity)
    }
}

impl From<Error> for InventoryServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound(Entity::Inventory);
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::Conflict,
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound(Entity::Product),
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => {
                Self::ValidationFailed(error.to_string())
            }
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_missing_inventory() {
        let error = InventoryServiceError::from(Error::RowNotFound);

        assert!(
            matches!(error, InventoryServiceError::NotFound(Entity::Inventory)),
            "expected NotFound(Inventory), got {error:?}"
        );
    }

    #[test]
    fn storage_errors_render_generic_message() {
        let error = InventoryServiceError::Sql(Error::PoolTimedOut);

        assert_eq!(error.user_message(), INTERNAL_MESSAGE);
    }
}
