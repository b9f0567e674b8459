//! Settlement service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    domain::settlement::retry::Transient,
    errors::{
        CONFLICT_MESSAGE, Entity, EntityError, FORBIDDEN_MESSAGE, INTERNAL_MESSAGE,
        INVALID_DATA_MESSAGE, not_found_message,
    },
};

#[derive(Debug, Error)]
pub enum SettlementServiceError {
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("callback signature mismatch")]
    Forbidden,

    #[error("payment was already settled with another outcome")]
    Conflict,

    #[error("invalid data: {0}")]
    ValidationFailed(String),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl SettlementServiceError {
    /// Message safe to show to the caller.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(entity) => not_found_message(*entity),
            Self::Forbidden => FORBIDDEN_MESSAGE.to_string(),
            Self::Conflict => CONFLICT_MESSAGE.to_string(),
            Self::ValidationFailed(_) => INVALID_DATA_MESSAGE.to_string(),
            Self::Sql(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl Transient for SettlementServiceError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Sql(error) if error.is_transient())
    }
}

impl EntityError for SettlementServiceError {
    fn not_found(entity: Entity) -> Self {
        Self::NotFound(entity)
    }
}

impl From<Error> for SettlementServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound(Entity::Payment);
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
