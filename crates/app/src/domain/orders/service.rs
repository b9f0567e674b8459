//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        orders::{
            data::{OrderFilter, OrderStatus, OrderUpdate},
            errors::OrdersServiceError,
            records::{OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
        },
        pagination::Page,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let order = self.orders.get_order(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_orders(
        &self,
        filter: OrderFilter,
        page: u32,
    ) -> Result<Page<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let (orders, total) = self.orders.list_orders(&mut tx, filter, page).await?;

        tx.commit().await?;

        Ok(Page::new(orders, page, total))
    }

    #[tracing::instrument(
        name = "orders.service.update_order",
        skip(self, update),
        fields(order_uuid = %order, status = ?update.status),
        err
    )]
    async fn update_order(
        &self,
        order: OrderUuid,
        update: OrderUpdate,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let status = update
            .status
            .as_deref()
            .map(str::parse::<OrderStatus>)
            .transpose()
            .map_err(|e| OrdersServiceError::ValidationFailed(e.to_string()))?;

        if update.currency.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(OrdersServiceError::ValidationFailed(
                "currency cannot be blank".to_string(),
            ));
        }

        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .orders
            .update_order(
                &mut tx,
                order,
                update.currency.as_deref(),
                status,
                update.note.as_deref(),
            )
            .await?;

        tx.commit().await?;

        info!(status = %updated.status, "updated order");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Orders matching the filter, newest first.
    async fn list_orders(
        &self,
        filter: OrderFilter,
        page: u32,
    ) -> Result<Page<OrderRecord>, OrdersServiceError>;

    /// Change currency, status or note. Line items are never touched.
    async fn update_order(
        &self,
        order: OrderUuid,
        update: OrderUpdate,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
