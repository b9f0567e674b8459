//! Settlement service.
//!
//! Applies the gateway's success or cancel callback to a pending payment and its order.
//! Callbacks must carry the signature minted when the checkout was opened.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::Zoned;
use mockall::automock;
use serde_json::json;
use tracing::{Span, debug, info, warn};

use crate::{
    database::Db,
    domain::{
        inventory::{
            Adjustment, PgInventoryRepository,
            data::{InventoryAction, NewInventoryTransaction},
            records::InventoryTransactionUuid,
        },
        orders::{PgOrdersRepository, records::OrderRecord},
        payments::{
            PgPaymentsRepository,
            records::{PaymentRecord, PaymentUuid},
        },
        settlement::{
            data::{RedirectUrls, SettlementOutcome, Transition, settled_statuses, transition},
            errors::SettlementServiceError,
            retry::{READ_ATTEMPTS, retry_immediately},
        },
        shipping::PgShippingRepository,
    },
    errors::{Entity, EntityError},
    gateway::{CallbackOutcome, CallbackSigner},
    identity::IdentityProvider,
    mailer::{
        MailMessage, Mailer, PAYMENT_CANCEL_TEMPLATE, PAYMENT_MAIL_SUBJECT,
        PAYMENT_SUCCESS_TEMPLATE,
    },
};

/// Payment and order as left by one settlement attempt.
#[derive(Debug)]
struct Settled {
    payment: PaymentRecord,
    order: OrderRecord,
    transitioned: bool,
}

#[derive(Clone)]
pub struct PgSettlementService {
    db: Db,
    payments: PgPaymentsRepository,
    orders: PgOrdersRepository,
    inventory: PgInventoryRepository,
    shipping: PgShippingRepository,
    identity: Arc<dyn IdentityProvider>,
    mailer: Arc<dyn Mailer>,
    signer: CallbackSigner,
    redirects: RedirectUrls,
}

impl PgSettlementService {
    #[must_use]
    pub fn new(
        db: Db,
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn Mailer>,
        signer: CallbackSigner,
        redirects: RedirectUrls,
    ) -> Self {
        Self {
            db,
            payments: PgPaymentsRepository::new(),
            orders: PgOrdersRepository::new(),
            inventory: PgInventoryRepository::new(),
            shipping: PgShippingRepository::new(),
            identity,
            mailer,
            signer,
            redirects,
        }
    }

    #[tracing::instrument(
        name = "settlement.service.settle",
        skip(self, signature),
        fields(
            payment_uuid = %payment,
            outcome = outcome.as_str(),
            order_uuid = tracing::field::Empty,
            transitioned = tracing::field::Empty
        ),
        err
    )]
    async fn settle(
        &self,
        payment: PaymentUuid,
        outcome: CallbackOutcome,
        signature: &str,
    ) -> Result<SettlementOutcome, SettlementServiceError> {
        if !self.signer.verify(outcome, payment, signature) {
            warn!("rejected callback with a bad signature");

            return Err(SettlementServiceError::Forbidden);
        }

        let settled = retry_immediately(READ_ATTEMPTS, |attempt| {
            debug!(attempt, "settling payment");

            self.settle_once(payment, outcome)
        })
        .await?;

        Span::current().record("order_uuid", tracing::field::display(settled.order.uuid));
        Span::current().record("transitioned", settled.transitioned);

        if settled.transitioned {
            info!(
                payment_status = %settled.payment.status,
                order_status = %settled.order.status,
                "settled payment"
            );

            self.notify(&settled.order, outcome).await;
        } else {
            info!("payment already settled with this outcome");
        }

        Ok(SettlementOutcome {
            redirect_url: format!("{}{payment}", self.redirects.base(outcome)),
            transitioned: settled.transitioned,
            payment_status: settled.payment.status,
            order_status: settled.order.status,
        })
    }

    /// One attempt in its own transaction, with the payment row locked throughout.
    async fn settle_once(
        &self,
        payment: PaymentUuid,
        outcome: CallbackOutcome,
    ) -> Result<Settled, SettlementServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let current = self
            .payments
            .get_payment(&mut tx, payment)
            .await
            .map_err(SettlementServiceError::missing(Entity::Payment))?;

        let order = self
            .orders
            .get_order(&mut tx, current.order_uuid)
            .await
            .map_err(SettlementServiceError::missing(Entity::Order))?;

        match transition(current.status, outcome) {
            Transition::AlreadyApplied => {
                return Ok(Settled {
                    payment: current,
                    order,
                    transitioned: false,
                });
            }
            Transition::Rejected => {
                warn!(status = %current.status, "callback contradicts settled payment");

                return Err(SettlementServiceError::Conflict);
            }
            Transition::Apply => {}
        }

        let (payment_status, order_status) = settled_statuses(outcome);

        let updated_payment = self
            .payments
            .update_status(&mut tx, payment, payment_status)
            .await?;

        let updated_order = self
            .orders
            .update_status(&mut tx, order.uuid, order_status)
            .await
            .map_err(SettlementServiceError::missing(Entity::Order))?;

        if outcome == CallbackOutcome::Cancel {
            self.restore_stock(&mut tx, &order).await?;

            let removed = self.shipping.delete_shipping(&mut tx, order.uuid).await?;

            debug!(removed, "removed shipping");
        }

        tx.commit().await?;

        Ok(Settled {
            payment: updated_payment,
            order: updated_order,
            transitioned: true,
        })
    }

    /// Give every line of a cancelled order back to stock, recording `cancel` entries.
    async fn restore_stock(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order: &OrderRecord,
    ) -> Result<(), SettlementServiceError> {
        let business_date = Zoned::now().date();
        let note = format!("cancelled order {}", order.uuid);

        let mut entries = Vec::with_capacity(order.items.len());

        for line in &order.items {
            let delta = InventoryAction::Cancel.signed_amount(line.quantity);

            match self
                .inventory
                .adjust_quantity(tx, line.product_id, delta)
                .await?
            {
                Adjustment::Applied(quantity) => {
                    debug!(product_uuid = %line.product_id, quantity, "restored stock");
                }
                Adjustment::Missing => {
                    return Err(SettlementServiceError::NotFound(Entity::Inventory));
                }
                Adjustment::Insufficient => {
                    return Err(SettlementServiceError::ValidationFailed(format!(
                        "cannot restore {} units of {}",
                        line.quantity, line.product_id
                    )));
                }
            }

            entries.push(NewInventoryTransaction {
                uuid: InventoryTransactionUuid::new(),
                product_uuid: line.product_id,
                action: InventoryAction::Cancel,
                amount: line.quantity,
                note: note.clone(),
                business_date,
            });
        }

        self.inventory.create_transactions(tx, &entries).await?;

        Ok(())
    }

    /// Tell the buyer about the outcome. Failures are logged, never surfaced.
    async fn notify(&self, order: &OrderRecord, outcome: CallbackOutcome) {
        let buyer = match self.identity.get_user(order.user_uuid).await {
            Ok(buyer) => buyer,
            Err(error) => {
                warn!(%error, "skipped payment mail: buyer lookup failed");

                return;
            }
        };

        let template_path = match outcome {
            CallbackOutcome::Success => PAYMENT_SUCCESS_TEMPLATE,
            CallbackOutcome::Cancel => PAYMENT_CANCEL_TEMPLATE,
        };

        let message = MailMessage {
            to: buyer.email,
            subject: PAYMENT_MAIL_SUBJECT.to_string(),
            template_path: template_path.to_string(),
            data: json!({
                "username": buyer.full_name,
                "order_id": order.uuid.to_string(),
            }),
        };

        if let Err(error) = self.mailer.send(message).await {
            warn!(%error, "failed to send payment mail");
        }
    }
}

impl Debug for PgSettlementService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgSettlementService")
            .field("db", &self.db)
            .field("redirects", &self.redirects)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SettlementService for PgSettlementService {
    async fn on_success(
        &self,
        payment: PaymentUuid,
        signature: &str,
    ) -> Result<SettlementOutcome, SettlementServiceError> {
        self.settle(payment, CallbackOutcome::Success, signature)
            .await
    }

    async fn on_cancel(
        &self,
        payment: PaymentUuid,
        signature: &str,
    ) -> Result<SettlementOutcome, SettlementServiceError> {
        self.settle(payment, CallbackOutcome::Cancel, signature)
            .await
    }
}

#[automock]
#[async_trait]
pub trait SettlementService: Send + Sync {
    /// Gateway reported a completed payment: payment `PAID`, order `CONFIRMED`.
    async fn on_success(
        &self,
        payment: PaymentUuid,
        signature: &str,
    ) -> Result<SettlementOutcome, SettlementServiceError>;

    /// Gateway reported an abandoned payment: both `CANCELLED`, stock restored, shipping
    /// removed.
    async fn on_cancel(
        &self,
        payment: PaymentUuid,
        signature: &str,
    ) -> Result<SettlementOutcome, SettlementServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::{CartsService, data::CartItemRequest},
            checkout::{
                CheckoutService,
                data::{CartPayment, DirectPayment, PaymentIntent, SelectedItem},
            },
            inventory::InventoryService,
            orders::{OrdersService, data::OrderStatus},
            payments::{PaymentsService, data::PaymentStatus},
            products::records::ProductRecord,
            shipping::{ShippingService, ShippingServiceError},
        },
        identity::UserRecord,
        mailer::{MailerError, MockMailer},
        test::{
            CALLBACK_CANCEL_REDIRECT_URL, CALLBACK_SUCCESS_REDIRECT_URL, TestContext,
            helpers::{create_stocked_product, create_user, delivery_address},
        },
    };

    use super::*;

    /// Put `quantity` units in the buyer's cart and pay for them.
    async fn cart_payment(
        ctx: &TestContext,
        buyer: &UserRecord,
        product: &ProductRecord,
        quantity: u32,
    ) -> TestResult<PaymentIntent> {
        ctx.carts
            .add_item(
                buyer.uuid,
                CartItemRequest {
                    product_uuid: product.uuid,
                    quantity,
                },
            )
            .await?;

        let intent = ctx
            .checkout
            .create_payment_through_cart(
                buyer.uuid,
                CartPayment {
                    items: vec![SelectedItem {
                        product_uuid: product.uuid,
                        quantity,
                    }],
                    note: String::new(),
                    address: delivery_address(),
                },
            )
            .await?;

        Ok(intent)
    }

    fn expect_mail(template: &'static str, to: String) -> MockMailer {
        let mut mailer = MockMailer::new();

        mailer
            .expect_send()
            .withf(move |message| {
                message.template_path == template
                    && message.to == to
                    && message.subject == PAYMENT_MAIL_SUBJECT
            })
            .times(1)
            .returning(|_| Ok(()));

        mailer
    }

    #[tokio::test]
    async fn cancel_restores_stock_and_removes_shipping() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = create_user(&ctx, "Binh").await?;
        let product = create_stocked_product(&ctx, 35_000, 10).await?;

        let intent = cart_payment(&ctx, &buyer, &product, 2).await?;

        assert_eq!(ctx.inventory.get_inventory(product.uuid).await?.quantity, 8);

        let settlement =
            ctx.settlement_with_mailer(expect_mail(PAYMENT_CANCEL_TEMPLATE, buyer.email.clone()));

        let signature = ctx.signer.sign(CallbackOutcome::Cancel, intent.payment_uuid);

        let outcome = settlement
            .on_cancel(intent.payment_uuid, &signature)
            .await?;

        assert!(outcome.transitioned, "pending payment should settle");
        assert_eq!(
            outcome.redirect_url,
            format!("{CALLBACK_CANCEL_REDIRECT_URL}{}", intent.payment_uuid)
        );
        assert_eq!(ctx.inventory.get_inventory(product.uuid).await?.quantity, 10);

        let payment = ctx.payments.get_payment(intent.payment_uuid).await?;
        let order = ctx.orders.get_order(intent.order_uuid).await?;

        assert_eq!(payment.status, PaymentStatus::Cancelled);
        assert_eq!(order.status, OrderStatus::Cancelled);

        let shipping = ctx.shipping.get_shipping(intent.order_uuid).await;

        assert!(
            matches!(shipping, Err(ShippingServiceError::NotFound(Entity::Shipping))),
            "expected shipping to be removed, got {shipping:?}"
        );

        let entries = ctx.inventory.list_transactions(product.uuid, 1).await?;
        let replayed: i64 = entries.items.iter().map(|entry| entry.signed_amount()).sum();

        assert_eq!(entries.items.len(), 2);
        assert_eq!(entries.items[0].action, InventoryAction::Cancel);
        assert_eq!(replayed, 0, "sale and cancel should net out");

        Ok(())
    }

    #[tokio::test]
    async fn success_confirms_order_once() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = create_user(&ctx, "Cuong").await?;
        let product = create_stocked_product(&ctx, 20_000, 5).await?;

        let intent = cart_payment(&ctx, &buyer, &product, 1).await?;

        let settlement =
            ctx.settlement_with_mailer(expect_mail(PAYMENT_SUCCESS_TEMPLATE, buyer.email.clone()));

        let signature = ctx.signer.sign(CallbackOutcome::Success, intent.payment_uuid);

        let first = settlement
            .on_success(intent.payment_uuid, &signature)
            .await?;

        assert!(first.transitioned, "first callback should settle");
        assert_eq!(first.payment_status, PaymentStatus::Paid);
        assert_eq!(first.order_status, OrderStatus::Confirmed);
        assert_eq!(
            first.redirect_url,
            format!("{CALLBACK_SUCCESS_REDIRECT_URL}{}", intent.payment_uuid)
        );

        let second = settlement
            .on_success(intent.payment_uuid, &signature)
            .await?;

        assert!(!second.transitioned, "replayed callback should be a no-op");
        assert_eq!(second.payment_status, PaymentStatus::Paid);
        assert_eq!(second.redirect_url, first.redirect_url);

        assert_eq!(
            ctx.orders.get_order(intent.order_uuid).await?.status,
            OrderStatus::Confirmed
        );
        assert_eq!(ctx.inventory.get_inventory(product.uuid).await?.quantity, 4);

        Ok(())
    }

    #[tokio::test]
    async fn cancel_after_success_is_a_conflict() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = create_user(&ctx, "Dao").await?;
        let product = create_stocked_product(&ctx, 20_000, 5).await?;

        let intent = cart_payment(&ctx, &buyer, &product, 2).await?;

        ctx.settlement
            .on_success(
                intent.payment_uuid,
                &ctx.signer.sign(CallbackOutcome::Success, intent.payment_uuid),
            )
            .await?;

        let result = ctx
            .settlement
            .on_cancel(
                intent.payment_uuid,
                &ctx.signer.sign(CallbackOutcome::Cancel, intent.payment_uuid),
            )
            .await;

        assert!(
            matches!(result, Err(SettlementServiceError::Conflict)),
            "expected Conflict, got {result:?}"
        );
        assert_eq!(ctx.inventory.get_inventory(product.uuid).await?.quantity, 3);
        assert_eq!(
            ctx.payments.get_payment(intent.payment_uuid).await?.status,
            PaymentStatus::Paid
        );

        Ok(())
    }

    #[tokio::test]
    async fn bad_signature_is_forbidden_and_changes_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = create_user(&ctx, "Em").await?;
        let product = create_stocked_product(&ctx, 20_000, 5).await?;

        let intent = cart_payment(&ctx, &buyer, &product, 2).await?;

        // A success signature must not authorise a cancel.
        let borrowed = ctx.signer.sign(CallbackOutcome::Success, intent.payment_uuid);

        for signature in ["", "deadbeef", borrowed.as_str()] {
            let result = ctx.settlement.on_cancel(intent.payment_uuid, signature).await;

            assert!(
                matches!(result, Err(SettlementServiceError::Forbidden)),
                "expected Forbidden for {signature:?}, got {result:?}"
            );
        }

        assert_eq!(
            ctx.payments.get_payment(intent.payment_uuid).await?.status,
            PaymentStatus::Pending
        );
        assert_eq!(ctx.inventory.get_inventory(product.uuid).await?.quantity, 3);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_payment_returns_not_found() {
        let ctx = TestContext::new().await;
        let payment = PaymentUuid::new();

        let result = ctx
            .settlement
            .on_success(payment, &ctx.signer.sign(CallbackOutcome::Success, payment))
            .await;

        assert!(
            matches!(result, Err(SettlementServiceError::NotFound(Entity::Payment))),
            "expected NotFound(Payment), got {result:?}"
        );
    }

    #[tokio::test]
    async fn mail_failure_does_not_undo_settlement() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = create_user(&ctx, "Gia").await?;
        let product = create_stocked_product(&ctx, 20_000, 5).await?;

        let intent = ctx
            .checkout
            .create_payment_direct(
                buyer.uuid,
                DirectPayment {
                    item: SelectedItem {
                        product_uuid: product.uuid,
                        quantity: 1,
                    },
                    note: String::new(),
                    address: delivery_address(),
                },
            )
            .await?;

        let mut mailer = MockMailer::new();

        mailer
            .expect_send()
            .times(1)
            .returning(|_| Err(MailerError::Rejected("relay offline".to_string())));

        let outcome = ctx
            .settlement_with_mailer(mailer)
            .on_success(
                intent.payment_uuid,
                &ctx.signer.sign(CallbackOutcome::Success, intent.payment_uuid),
            )
            .await?;

        assert!(outcome.transitioned, "settlement should stand");
        assert_eq!(
            ctx.payments.get_payment(intent.payment_uuid).await?.status,
            PaymentStatus::Paid
        );

        Ok(())
    }
}
