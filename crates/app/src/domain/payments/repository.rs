//! Payments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::{
    domain::{
        amounts::{encode_amount, try_get_amount},
        orders::records::OrderUuid,
        pagination::{PAGE_SIZE, offset},
        payments::{
            data::{NewPayment, PaymentFilter, PaymentStatus},
            records::{PaymentRecord, PaymentUuid},
        },
    },
    identity::UserUuid,
};

const CREATE_PAYMENT_SQL: &str = include_str!("sql/create_payment.sql");
const GET_PAYMENT_SQL: &str = include_str!("sql/get_payment.sql");
const UPDATE_PAYMENT_SQL: &str = include_str!("sql/update_payment.sql");
const UPDATE_PAYMENT_STATUS_SQL: &str = include_str!("sql/update_payment_status.sql");
const LIST_PAYMENTS_SQL: &str = include_str!("sql/list_payments.sql");
const COUNT_PAYMENTS_SQL: &str = include_str!("sql/count_payments.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: NewPayment,
    ) -> Result<PaymentRecord, sqlx::Error> {
        let amount_i64 = encode_amount(payment.amount, "amount")?;

        query_as::<Postgres, PaymentRecord>(CREATE_PAYMENT_SQL)
            .bind(payment.uuid.into_uuid())
            .bind(payment.user_uuid.into_uuid())
            .bind(payment.order_uuid.into_uuid())
            .bind(payment.transaction_id)
            .bind(amount_i64)
            .bind(payment.currency)
            .bind(payment.status.as_str())
            .bind(payment.method)
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch and lock a payment.
    pub(crate) async fn get_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(GET_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        currency: Option<&str>,
        method: Option<&str>,
        status: Option<PaymentStatus>,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(UPDATE_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .bind(currency)
            .bind(method)
            .bind(status.map(PaymentStatus::as_str))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        status: PaymentStatus,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(UPDATE_PAYMENT_STATUS_SQL)
            .bind(payment.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: PaymentFilter,
        page: u32,
    ) -> Result<(Vec<PaymentRecord>, u64), sqlx::Error> {
        let user = filter.user_uuid.map(UserUuid::into_uuid);
        let status = filter.status.map(PaymentStatus::as_str);

        let payments = query_as::<Postgres, PaymentRecord>(LIST_PAYMENTS_SQL)
            .bind(user)
            .bind(status)
            .bind(i64::from(PAGE_SIZE))
            .bind(offset(page))
            .fetch_all(&mut **tx)
            .await?;

        let total: i64 = query_scalar(COUNT_PAYMENTS_SQL)
            .bind(user)
            .bind(status)
            .fetch_one(&mut **tx)
            .await?;

        Ok((payments, u64::try_from(total).unwrap_or_default()))
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        let status = status
            .parse::<PaymentStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            transaction_id: row.try_get("transaction_id")?,
            amount: try_get_amount(row, "amount")?,
            currency: row.try_get("currency")?,
            status,
            method: row.try_get("method")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
