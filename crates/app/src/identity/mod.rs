//! Buyer identity lookups.
//!
//! Accounts are owned by the identity system; the order flows only read them.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};
use thiserror::Error;
use uuid::Uuid;

use crate::uuids::TypedUuid;

const GET_USER_SQL: &str = include_str!("sql/get_user.sql");

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// User Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub uuid: UserUuid,
    pub email: String,
    pub full_name: String,
    pub role_uuid: Option<Uuid>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("user not found")]
    NotFound,

    #[error("identity lookup failed")]
    Lookup(#[source] sqlx::Error),
}

impl From<sqlx::Error> for IdentityError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound,
            error => Self::Lookup(error),
        }
    }
}

#[automock]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a user by id.
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, IdentityError>;
}

/// Reads users from the shared `users` table.
#[derive(Debug, Clone)]
pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, IdentityError> {
        query_as::<Postgres, UserRecord>(GET_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            role_uuid: row.try_get("role_uuid")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::create_user};

    use super::*;

    #[tokio::test]
    async fn get_user_returns_profile() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Nguyen Van A").await?;

        let found = PgIdentityProvider::new(ctx.db.pool().clone())
            .get_user(user.uuid)
            .await?;

        assert_eq!(found, user);

        Ok(())
    }

    #[tokio::test]
    async fn get_user_unknown_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = PgIdentityProvider::new(ctx.db.pool().clone())
            .get_user(UserUuid::new())
            .await;

        assert!(
            matches!(result, Err(IdentityError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
