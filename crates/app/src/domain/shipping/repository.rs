//! Shipping Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};

use crate::domain::{
    orders::records::OrderUuid,
    shipping::{data::NewShipping, data::ShippingDetail, records::ShippingRecord},
};

const CREATE_SHIPPING_SQL: &str = include_str!("sql/create_shipping.sql");
const GET_SHIPPING_SQL: &str = include_str!("sql/get_shipping.sql");
const DELETE_SHIPPING_SQL: &str = include_str!("sql/delete_shipping.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgShippingRepository;

impl PgShippingRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_shipping(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        shipping: NewShipping,
    ) -> Result<ShippingRecord, sqlx::Error> {
        query_as::<Postgres, ShippingRecord>(CREATE_SHIPPING_SQL)
            .bind(shipping.order_uuid.into_uuid())
            .bind(shipping.delivery_code)
            .bind(shipping.shipping_unit)
            .bind(Json(&shipping.detail))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_shipping(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<ShippingRecord, sqlx::Error> {
        query_as::<Postgres, ShippingRecord>(GET_SHIPPING_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_shipping(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_SHIPPING_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for ShippingRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(detail) = row.try_get::<Json<ShippingDetail>, _>("shipping_detail")?;

        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            delivery_code: row.try_get("delivery_code")?,
            shipping_unit: row.try_get("shipping_unit")?,
            detail,
            delivered_at: row
                .try_get::<Option<SqlxTimestamp>, _>("delivered_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
