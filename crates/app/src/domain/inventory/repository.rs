//! Inventory Repository

use jiff::civil::Date;
use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    amounts::try_get_quantity,
    inventory::{
        data::{InventoryAction, InventoryTransactionUpdate, NewInventoryTransaction},
        records::{InventoryRecord, InventoryTransactionRecord, InventoryTransactionUuid},
    },
    pagination::{PAGE_SIZE, offset},
    products::records::ProductUuid,
};

const GET_INVENTORY_SQL: &str = include_str!("sql/get_inventory.sql");
const CREATE_INVENTORY_SQL: &str = include_str!("sql/create_inventory.sql");
const ADJUST_INVENTORY_SQL: &str = include_str!("sql/adjust_inventory.sql");
const INVENTORY_EXISTS_SQL: &str = include_str!("sql/inventory_exists.sql");
const CREATE_TRANSACTION_SQL: &str = include_str!("sql/create_transaction.sql");
const CREATE_TRANSACTIONS_SQL: &str = include_str!("sql/create_transactions.sql");
const GET_TRANSACTION_SQL: &str = include_str!("sql/get_transaction.sql");
const UPDATE_TRANSACTION_SQL: &str = include_str!("sql/update_transaction.sql");
const LIST_TRANSACTIONS_BY_PRODUCT_SQL: &str =
    include_str!("sql/list_transactions_by_product.sql");
const COUNT_TRANSACTIONS_BY_PRODUCT_SQL: &str =
    include_str!("sql/count_transactions_by_product.sql");

/// Result of a floor-checked stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Adjustment {
    /// Applied; carries the new quantity.
    Applied(i64),

    /// Rejected because stock would go negative.
    Insufficient,

    /// The product has no inventory row.
    Missing,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgInventoryRepository;

impl PgInventoryRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_inventory(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<InventoryRecord, sqlx::Error> {
        query_as::<Postgres, InventoryRecord>(GET_INVENTORY_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_inventory(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<InventoryRecord, sqlx::Error> {
        query_as::<Postgres, InventoryRecord>(CREATE_INVENTORY_SQL)
            .bind(product.into_uuid())
            .bind(quantity)
            .fetch_one(&mut **tx)
            .await
    }

    /// Add `delta` to the product's stock in one statement, refusing to go below zero.
    ///
    /// The update takes the row lock, so concurrent adjustments serialize on it and never
    /// act on a stale quantity.
    #[tracing::instrument(
        name = "inventory.repository.adjust_quantity",
        skip(self, tx),
        fields(product_uuid = %product),
        err
    )]
    pub(crate) async fn adjust_quantity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        delta: i64,
    ) -> Result<Adjustment, sqlx::Error> {
        let updated: Option<i64> = query_scalar(ADJUST_INVENTORY_SQL)
            .bind(product.into_uuid())
            .bind(delta)
            .fetch_optional(&mut **tx)
            .await?;

        if let Some(quantity) = updated {
            debug!(quantity, "adjusted inventory");

            return Ok(Adjustment::Applied(quantity));
        }

        let exists: bool = query_scalar(INVENTORY_EXISTS_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(if exists {
            Adjustment::Insufficient
        } else {
            Adjustment::Missing
        })
    }

    pub(crate) async fn create_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: NewInventoryTransaction,
    ) -> Result<InventoryTransactionRecord, sqlx::Error> {
        query_as::<Postgres, InventoryTransactionRecord>(CREATE_TRANSACTION_SQL)
            .bind(entry.uuid.into_uuid())
            .bind(entry.product_uuid.into_uuid())
            .bind(i64::from(entry.amount))
            .bind(entry.action.as_str())
            .bind(entry.note)
            .bind(SqlxDate::from(entry.business_date))
            .fetch_one(&mut **tx)
            .await
    }

    /// Append several ledger entries in one round trip.
    #[tracing::instrument(
        name = "inventory.repository.create_transactions",
        skip(self, tx, entries),
        fields(entry_count = entries.len()),
        err
    )]
    pub(crate) async fn create_transactions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entries: &[NewInventoryTransaction],
    ) -> Result<u64, sqlx::Error> {
        if entries.is_empty() {
            return Ok(0);
        }

        let uuids: Vec<Uuid> = entries.iter().map(|e| e.uuid.into_uuid()).collect();
        let products: Vec<Uuid> = entries.iter().map(|e| e.product_uuid.into_uuid()).collect();
        let amounts: Vec<i64> = entries.iter().map(|e| i64::from(e.amount)).collect();
        let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
        let notes: Vec<&str> = entries.iter().map(|e| e.note.as_str()).collect();
        let dates: Vec<String> = entries.iter().map(|e| e.business_date.to_string()).collect();

        let rows_affected = query(CREATE_TRANSACTIONS_SQL)
            .bind(&uuids)
            .bind(&products)
            .bind(&amounts)
            .bind(&actions)
            .bind(&notes)
            .bind(&dates)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Fetch and lock a ledger entry.
    pub(crate) async fn get_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction: InventoryTransactionUuid,
    ) -> Result<InventoryTransactionRecord, sqlx::Error> {
        query_as::<Postgres, InventoryTransactionRecord>(GET_TRANSACTION_SQL)
            .bind(transaction.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction: InventoryTransactionUuid,
        update: &InventoryTransactionUpdate,
        note: &str,
    ) -> Result<InventoryTransactionRecord, sqlx::Error> {
        query_as::<Postgres, InventoryTransactionRecord>(UPDATE_TRANSACTION_SQL)
            .bind(transaction.into_uuid())
            .bind(update.product_uuid.into_uuid())
            .bind(i64::from(update.amount))
            .bind(update.action.as_str())
            .bind(note)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_transactions_by_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        page: u32,
    ) -> Result<(Vec<InventoryTransactionRecord>, u64), sqlx::Error> {
        let entries = query_as::<Postgres, InventoryTransactionRecord>(
            LIST_TRANSACTIONS_BY_PRODUCT_SQL,
        )
        .bind(product.into_uuid())
        .bind(i64::from(PAGE_SIZE))
        .bind(offset(page))
        .fetch_all(&mut **tx)
        .await?;

        let total: i64 = query_scalar(COUNT_TRANSACTIONS_BY_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok((entries, u64::try_from(total).unwrap_or_default()))
    }
}

impl<'r> FromRow<'r, PgRow> for InventoryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: row.try_get("quantity")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for InventoryTransactionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let action: String = row.try_get("action")?;

        let action = action
            .parse::<InventoryAction>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "action".to_string(),
                source: Box::new(e),
            })?;

        let business_date: Date = row.try_get::<SqlxDate, _>("business_date")?.to_jiff();

        Ok(Self {
            uuid: InventoryTransactionUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            amount: try_get_quantity(row, "amount")?,
            action,
            note: row.try_get("note")?,
            business_date,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
