//! Checkout service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    errors::{
        CONFLICT_MESSAGE, Entity, EntityError, INTERNAL_MESSAGE, INVALID_DATA_MESSAGE,
        not_found_message, out_of_stock_message,
    },
    gateway::GatewayError,
    identity::IdentityError,
};

#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("insufficient stock for {requested} units")]
    OutOfStock { requested: u32 },

    #[error("invalid data: {0}")]
    ValidationFailed(String),

    #[error("checkout conflicts with existing data")]
    Conflict,

    #[error("identity lookup failed")]
    Identity(#[source] IdentityError),

    #[error("payment gateway failed")]
    Gateway(#[from] GatewayError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl CheckoutServiceError {
    /// Message safe to show to the caller.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(entity) => not_found_message(*entity),
            Self::OutOfStock { requested } => out_of_stock_message(*requested),
            Self::ValidationFailed(_) => INVALID_DATA_MESSAGE.to_string(),
            Self::Conflict => CONFLICT_MESSAGE.to_string(),
            Self::Identity(_) | Self::Gateway(_) | Self::Sql(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl EntityError for CheckoutServiceError {
    fn not_found(entity: Entity) -> Self {
        Self::NotFound(entity)
    }
}

impl From<IdentityError> for CheckoutServiceError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::NotFound => Self::NotFound(Entity::User),
            error @ IdentityError::Lookup(_) => Self::Identity(error),
        }
    }
}

impl From<Error> for CheckoutServiceError {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_failures_hide_details() {
        let error = CheckoutServiceError::from(GatewayError::Rejected {
            code: "20".to_string(),
            desc: "invalid signature".to_string(),
        });

        assert_eq!(error.user_message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn unknown_user_is_not_found() {
        let error = CheckoutServiceError::from(IdentityError::NotFound);

        assert!(
            matches!(error, CheckoutServiceError::NotFound(Entity::User)),
            "expected NotFound(User), got {error:?}"
        );
        assert_eq!(error.user_message(), "User not found.");
    }
}
