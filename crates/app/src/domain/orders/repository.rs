//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar, types::Json};

use crate::{
    domain::{
        amounts::{encode_amount, try_get_amount},
        line_items::LineItem,
        orders::{
            data::{NewOrder, OrderFilter, OrderStatus},
            records::{OrderRecord, OrderUuid},
        },
        pagination::{PAGE_SIZE, offset},
    },
    identity::UserUuid,
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const UPDATE_ORDER_SQL: &str = include_str!("sql/update_order.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const COUNT_ORDERS_SQL: &str = include_str!("sql/count_orders.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: NewOrder,
    ) -> Result<OrderRecord, sqlx::Error> {
        let total_i64 = encode_amount(order.total_amount, "total_amount")?;

        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.user_uuid.into_uuid())
            .bind(Json(&order.items))
            .bind(total_i64)
            .bind(order.currency)
            .bind(order.status.as_str())
            .bind(order.note)
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch and lock an order.
    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        currency: Option<&str>,
        status: Option<OrderStatus>,
        note: Option<&str>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(currency)
            .bind(status.map(OrderStatus::as_str))
            .bind(note)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: OrderFilter,
        page: u32,
    ) -> Result<(Vec<OrderRecord>, u64), sqlx::Error> {
        let user = filter.user_uuid.map(UserUuid::into_uuid);
        let status = filter.status.map(OrderStatus::as_str);

        let orders = query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(user)
            .bind(status)
            .bind(i64::from(PAGE_SIZE))
            .bind(offset(page))
            .fetch_all(&mut **tx)
            .await?;

        let total: i64 = query_scalar(COUNT_ORDERS_SQL)
            .bind(user)
            .bind(status)
            .fetch_one(&mut **tx)
            .await?;

        Ok((orders, u64::try_from(total).unwrap_or_default()))
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(items) = row.try_get::<Json<Vec<LineItem>>, _>("items")?;

        let status: String = row.try_get("status")?;

        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            items,
            total_amount: try_get_amount(row, "total_amount")?,
            currency: row.try_get("currency")?,
            status,
            note: row.try_get("note")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
