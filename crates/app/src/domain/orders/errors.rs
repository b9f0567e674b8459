//! Orders service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::errors::{
    CONFLICT_MESSAGE, Entity, EntityError, INTERNAL_MESSAGE, INVALID_DATA_MESSAGE,
    not_found_message,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("invalid data: {0}")]
    ValidationFailed(String),

    #[error("order already exists")]
    Conflict,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl OrdersServiceError {
    /// Message safe to show to the caller.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(entity) => not_found_message(*entity),
            Self::ValidationFailed(_) => INVALID_DATA_MESSAGE.to_string(),
            Self::Conflict => CONFLICT_MESSAGE.to_string(),
            Self::Sql(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl EntityError for OrdersServiceError {
    fn not_found(entity: Entity) -> Self {
        Self::NotFound(entity)
    }
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound(Entity::Order);
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::Conflict,
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound(Entity::User),
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => {
                Self::ValidationFailed(error.to_string())
            }
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
