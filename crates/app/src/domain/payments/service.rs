//! Payments service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        pagination::Page,
        payments::{
            data::{PaymentFilter, PaymentStatus, PaymentUpdate},
            errors::PaymentsServiceError,
            records::{PaymentRecord, PaymentUuid},
            repository::PgPaymentsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgPaymentsService {
    db: Db,
    payments: PgPaymentsRepository,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            payments: PgPaymentsRepository::new(),
        }
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    async fn get_payment(
        &self,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let payment = self.payments.get_payment(&mut tx, payment).await?;

        tx.commit().await?;

        Ok(payment)
    }

    async fn list_payments(
        &self,
        filter: PaymentFilter,
        page: u32,
    ) -> Result<Page<PaymentRecord>, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let (payments, total) = self.payments.list_payments(&mut tx, filter, page).await?;

        tx.commit().await?;

        Ok(Page::new(payments, page, total))
    }

    #[tracing::instrument(
        name = "payments.service.update_payment",
        skip(self, update),
        fields(payment_uuid = %payment, status = ?update.status),
        err
    )]
    async fn update_payment(
        &self,
        payment: PaymentUuid,
        update: PaymentUpdate,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let status = update
            .status
            .as_deref()
            .map(str::parse::<PaymentStatus>)
            .transpose()
            .map_err(|e| PaymentsServiceError::ValidationFailed(e.to_string()))?;

        for (field, value) in [("currency", &update.currency), ("method", &update.method)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(PaymentsServiceError::ValidationFailed(format!(
                    "{field} cannot be blank"
                )));
            }
        }

        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .payments
            .update_payment(
                &mut tx,
                payment,
                update.currency.as_deref(),
                update.method.as_deref(),
                status,
            )
            .await?;

        tx.commit().await?;

        info!(status = %updated.status, "updated payment");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    async fn get_payment(&self, payment: PaymentUuid)
    -> Result<PaymentRecord, PaymentsServiceError>;

    /// Payments matching the filter, newest first.
    async fn list_payments(
        &self,
        filter: PaymentFilter,
        page: u32,
    ) -> Result<Page<PaymentRecord>, PaymentsServiceError>;

    /// Change currency, method or status. The amount and order link are never touched.
    async fn update_payment(
        &self,
        payment: PaymentUuid,
        update: PaymentUpdate,
    ) -> Result<PaymentRecord, PaymentsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::payments::PgPaymentsRepository,
        errors::Entity,
        test::{
            TestContext,
            helpers::{create_order, create_stocked_product, create_user, pending_payment},
        },
    };

    use super::*;

    #[tokio::test]
    async fn get_payment_unknown_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.payments.get_payment(PaymentUuid::new()).await;

        assert!(
            matches!(result, Err(PaymentsServiceError::NotFound(Entity::Payment))),
            "expected NotFound(Payment), got {result:?}"
        );
    }

    async fn stored_payment(ctx: &TestContext, name: &str) -> TestResult<PaymentRecord> {
        let user = create_user(ctx, name).await?;
        let product = create_stocked_product(ctx, 1000, 3).await?;
        let order = create_order(ctx, user.uuid, &product, 1).await?;

        let mut tx = ctx.db.pool().begin().await?;

        let payment = PgPaymentsRepository::new()
            .create_payment(&mut tx, pending_payment(&order))
            .await?;

        tx.commit().await?;

        Ok(payment)
    }

    #[tokio::test]
    async fn update_payment_changes_only_given_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let created = stored_payment(&ctx, "Lan").await?;

        let updated = ctx
            .payments
            .update_payment(
                created.uuid,
                PaymentUpdate {
                    status: Some("refunded".to_string()),
                    method: Some("BANK_TRANSFER".to_string()),
                    ..PaymentUpdate::default()
                },
            )
            .await?;

        assert_eq!(updated.status, PaymentStatus::Refunded);
        assert_eq!(updated.method, "BANK_TRANSFER");
        assert_eq!(updated.currency, created.currency);
        assert_eq!(updated.amount, created.amount);
        assert_eq!(updated.order_uuid, created.order_uuid);
        assert_eq!(updated.transaction_id, created.transaction_id);

        Ok(())
    }

    #[tokio::test]
    async fn update_payment_rejects_unknown_status() -> TestResult {
        let ctx = TestContext::new().await;
        let created = stored_payment(&ctx, "Minh").await?;

        let result = ctx
            .payments
            .update_payment(
                created.uuid,
                PaymentUpdate {
                    status: Some("SETTLED".to_string()),
                    currency: Some("USD".to_string()),
                    ..PaymentUpdate::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::ValidationFailed(_))),
            "expected ValidationFailed, got {result:?}"
        );

        let stored = ctx.payments.get_payment(created.uuid).await?;

        assert_eq!(stored.status, PaymentStatus::Pending);
        assert_eq!(stored.currency, created.currency);

        Ok(())
    }

    #[tokio::test]
    async fn update_payment_rejects_blank_method() -> TestResult {
        let ctx = TestContext::new().await;
        let created = stored_payment(&ctx, "Nam").await?;

        let result = ctx
            .payments
            .update_payment(
                created.uuid,
                PaymentUpdate {
                    method: Some("  ".to_string()),
                    ..PaymentUpdate::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::ValidationFailed(_))),
            "expected ValidationFailed, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_payment_unknown_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .payments
            .update_payment(
                PaymentUuid::new(),
                PaymentUpdate {
                    status: Some("PAID".to_string()),
                    ..PaymentUpdate::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::NotFound(Entity::Payment))),
            "expected NotFound(Payment), got {result:?}"
        );
    }

    #[tokio::test]
    async fn second_payment_for_order_is_a_conflict() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Hieu").await?;
        let product = create_stocked_product(&ctx, 1000, 3).await?;
        let order = create_order(&ctx, user.uuid, &product, 1).await?;
        let repository = PgPaymentsRepository::new();

        let mut tx = ctx.db.pool().begin().await?;

        let payment = repository
            .create_payment(&mut tx, pending_payment(&order))
            .await?;

        tx.commit().await?;

        let mut tx = ctx.db.pool().begin().await?;

        let result = repository
            .create_payment(&mut tx, pending_payment(&order))
            .await
            .map_err(PaymentsServiceError::from);

        assert!(
            matches!(result, Err(PaymentsServiceError::Conflict)),
            "expected Conflict, got {result:?}"
        );

        drop(tx);

        let stored = ctx.payments.get_payment(payment.uuid).await?;

        assert_eq!(stored.status, PaymentStatus::Pending);
        assert_eq!(stored.order_uuid, order.uuid);
        assert_eq!(stored.amount, order.total_amount);

        Ok(())
    }

    #[tokio::test]
    async fn list_payments_filters_by_status() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Khanh").await?;
        let product = create_stocked_product(&ctx, 1000, 5).await?;
        let repository = PgPaymentsRepository::new();

        let mut tx = ctx.db.pool().begin().await?;

        for _ in 0..3 {
            let order = create_order(&ctx, user.uuid, &product, 1).await?;

            repository
                .create_payment(&mut tx, pending_payment(&order))
                .await?;
        }

        tx.commit().await?;

        let pending = ctx
            .payments
            .list_payments(
                PaymentFilter {
                    user_uuid: Some(user.uuid),
                    status: Some(PaymentStatus::Pending),
                },
                1,
            )
            .await?;

        assert_eq!(pending.items.len(), 3);

        let paid = ctx
            .payments
            .list_payments(
                PaymentFilter {
                    user_uuid: None,
                    status: Some(PaymentStatus::Paid),
                },
                1,
            )
            .await?;

        assert!(paid.items.is_empty(), "nothing has been paid yet");
        assert_eq!(paid.total_pages, 0);

        Ok(())
    }
}
