//! Shipping service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        orders::records::OrderUuid,
        shipping::{
            errors::ShippingServiceError, records::ShippingRecord,
            repository::PgShippingRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgShippingService {
    db: Db,
    shipping: PgShippingRepository,
}

impl PgShippingService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            shipping: PgShippingRepository::new(),
        }
    }
}

#[async_trait]
impl ShippingService for PgShippingService {
    async fn get_shipping(&self, order: OrderUuid) -> Result<ShippingRecord, ShippingServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let shipping = self.shipping.get_shipping(&mut tx, order).await?;

        tx.commit().await?;

        Ok(shipping)
    }
}

#[automock]
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Delivery record of an order.
    async fn get_shipping(&self, order: OrderUuid) -> Result<ShippingRecord, ShippingServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::shipping::{
            PgShippingRepository,
            data::{NewShipping, ShippingDetail},
        },
        errors::Entity,
        test::{
            TestContext,
            helpers::{create_order, create_stocked_product, create_user},
        },
    };

    use super::*;

    #[tokio::test]
    async fn stored_detail_round_trips() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Long").await?;
        let product = create_stocked_product(&ctx, 1000, 3).await?;
        let order = create_order(&ctx, user.uuid, &product, 1).await?;

        let detail = ShippingDetail {
            recipient_name: user.full_name.clone(),
            address: "5 Hang Bai".to_string(),
            city: "Hanoi".to_string(),
            country: "Vietnam".to_string(),
            phone_number: "0912345678".to_string(),
        };

        let mut tx = ctx.db.pool().begin().await?;

        PgShippingRepository::new()
            .create_shipping(
                &mut tx,
                NewShipping {
                    order_uuid: order.uuid,
                    delivery_code: "1234".to_string(),
                    shipping_unit: String::new(),
                    detail: detail.clone(),
                },
            )
            .await?;

        tx.commit().await?;

        let shipping = ctx.shipping.get_shipping(order.uuid).await?;

        assert_eq!(shipping.detail, detail);
        assert_eq!(shipping.delivery_code, "1234");
        assert!(shipping.delivered_at.is_none(), "not delivered yet");

        Ok(())
    }

    #[tokio::test]
    async fn missing_shipping_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.shipping.get_shipping(OrderUuid::new()).await;

        assert!(
            matches!(result, Err(ShippingServiceError::NotFound(Entity::Shipping))),
            "expected NotFound(Shipping), got {result:?}"
        );
    }
}
