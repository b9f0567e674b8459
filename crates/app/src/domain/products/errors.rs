//! Products service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::errors::{
    CONFLICT_MESSAGE, Entity, INTERNAL_MESSAGE, INVALID_DATA_MESSAGE, not_found_message,
};

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("product already exists")]
    Conflict,

    #[error("product not found")]
    NotFound,

    #[error("invalid data: {0}")]
    ValidationFailed(String),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl ProductsServiceError {
    /// Message safe to show to the caller.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Conflict => CONFLICT_MESSAGE.to_string(),
            Self::NotFound => not_found_message(Entity::Product),
            Self::ValidationFailed(_) => INVALID_DATA_MESSAGE.to_string(),
            Self::Sql(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl From<Error> for ProductsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::Conflict,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => {
                Self::ValidationFailed(error.to_string())
            }
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
