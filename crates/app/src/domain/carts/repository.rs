//! Carts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};

use crate::{
    domain::{carts::records::CartRecord, line_items::LineItem},
    identity::UserUuid,
};

const GET_CART_SQL: &str = include_str!("sql/get_cart.sql");
const SAVE_CART_SQL: &str = include_str!("sql/save_cart.sql");
const DELETE_CART_SQL: &str = include_str!("sql/delete_cart.sql");
const LOCK_CART_SQL: &str = include_str!("sql/lock_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Serialise cart writers for `user` until the transaction ends.
    ///
    /// Row locks cannot cover a cart that does not exist yet, so the first insert
    /// is guarded by a transaction-scoped advisory lock on the user id.
    pub(crate) async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<(), sqlx::Error> {
        query(LOCK_CART_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Fetch and lock the user's cart, if any.
    pub(crate) async fn find_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        query_as::<Postgres, CartRecord>(GET_CART_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert or replace the user's lines and push expiry out by a week.
    pub(crate) async fn save_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        items: &[LineItem],
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(SAVE_CART_SQL)
            .bind(user.into_uuid())
            .bind(Json(items))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Persist the remaining lines, or drop the cart once it is empty.
    pub(crate) async fn save_or_delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        items: &[LineItem],
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        if items.is_empty() {
            self.delete_cart(tx, user).await?;

            return Ok(None);
        }

        self.save_cart(tx, user, items).await.map(Some)
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(items) = row.try_get::<Json<Vec<LineItem>>, _>("items")?;

        Ok(Self {
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            items,
            expired_at: row.try_get::<SqlxTimestamp, _>("expired_at")?.to_jiff(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
