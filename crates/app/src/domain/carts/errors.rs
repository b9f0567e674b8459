//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::errors::{
    Entity, EntityError, INTERNAL_MESSAGE, INVALID_DATA_MESSAGE, not_found_message, out_of_stock_message,
};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("only part of {requested} requested units are in stock")]
    OutOfStock { requested: u32 },

    #[error("invalid data: {0}")]
    ValidationFailed(String),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl CartsServiceError {
    /// Message safe to show to the caller.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(entity) => not_found_message(*entity),
            Self::OutOfStock { requested } => out_of_stock_message(*requested),
            Self::ValidationFailed(_) => INVALID_DATA_MESSAGE.to_string(),
            Self::Sql(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl EntityError for CartsServiceError {
    fn not_found(entity: Entity) -> Self {
        Self::NotFound(entity)
    }
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound(Entity::Cart);
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound(Entity::User),
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => {
                Self::ValidationFailed(error.to_string())
            }
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
