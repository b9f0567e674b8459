//! Checkout service.
//!
//! Turns cart lines or a single product into an order, and optionally a pending payment with
//! a hosted checkout link. Every flow runs in one transaction: stock is taken with floor-checked
//! decrements, so a failure at any later step (including the gateway call) rolls the stock back
//! together with the cart, order, payment and shipping writes.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::Zoned;
use mockall::automock;
use smallvec::SmallVec;
use sqlx::{Postgres, Transaction};
use tracing::{Span, debug, info};

use crate::{
    database::Db,
    domain::{
        carts::PgCartsRepository,
        checkout::{
            data::{
                CallbackUrls, CartPayment, CheckoutOrder, DirectPayment, PaymentIntent,
                SelectedItem, generate_order_code, merge_selected,
            },
            errors::CheckoutServiceError,
        },
        inventory::{
            Adjustment, PgInventoryRepository,
            data::{InventoryAction, NewInventoryTransaction},
            records::InventoryTransactionUuid,
        },
        line_items::{LineItem, find_line, take_quantity},
        orders::{
            PgOrdersRepository,
            data::{DEFAULT_CURRENCY, NewOrder, OrderStatus},
            records::{OrderRecord, OrderUuid},
        },
        payments::{
            PgPaymentsRepository,
            data::{NewPayment, PaymentStatus},
            records::PaymentUuid,
        },
        products::PgProductsRepository,
        shipping::{
            PgShippingRepository,
            data::{DeliveryAddress, NewShipping},
        },
    },
    errors::{Entity, EntityError},
    gateway::{CallbackOutcome, CallbackSigner, CheckoutSession, GatewayItem, PaymentGateway},
    identity::{IdentityProvider, UserRecord, UserUuid},
};

/// Stock taken for a set of selected items, not yet tied to an order.
#[derive(Debug)]
struct Reservation {
    lines: Vec<LineItem>,
    entries: Vec<NewInventoryTransaction>,
    total: u64,
}

/// What a new pending payment is for.
#[derive(Debug)]
struct PaymentDraft {
    lines: Vec<LineItem>,
    total: u64,
    currency: String,
    note: String,
    address: DeliveryAddress,
}

#[derive(Clone)]
pub struct PgCheckoutService {
    db: Db,
    carts: PgCartsRepository,
    products: PgProductsRepository,
    inventory: PgInventoryRepository,
    orders: PgOrdersRepository,
    payments: PgPaymentsRepository,
    shipping: PgShippingRepository,
    identity: Arc<dyn IdentityProvider>,
    gateway: Arc<dyn PaymentGateway>,
    signer: CallbackSigner,
    callbacks: CallbackUrls,
}

impl PgCheckoutService {
    #[must_use]
    pub fn new(
        db: Db,
        identity: Arc<dyn IdentityProvider>,
        gateway: Arc<dyn PaymentGateway>,
        signer: CallbackSigner,
        callbacks: CallbackUrls,
    ) -> Self {
        Self {
            db,
            carts: PgCartsRepository::new(),
            products: PgProductsRepository::new(),
            inventory: PgInventoryRepository::new(),
            orders: PgOrdersRepository::new(),
            payments: PgPaymentsRepository::new(),
            shipping: PgShippingRepository::new(),
            identity,
            gateway,
            signer,
            callbacks,
        }
    }

    /// Take stock for every item and stage one sale entry per product.
    async fn reserve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        items: &[SelectedItem],
        note: &str,
    ) -> Result<Reservation, CheckoutServiceError> {
        let business_date = Zoned::now().date();

        let mut lines = Vec::with_capacity(items.len());
        let mut entries = Vec::with_capacity(items.len());
        let mut total = 0_u64;

        for item in items {
            let product = self
                .products
                .get_product(tx, item.product_uuid)
                .await
                .map_err(CheckoutServiceError::missing(Entity::Product))?;

            let delta = InventoryAction::Sale.signed_amount(item.quantity);

            match self
                .inventory
                .adjust_quantity(tx, item.product_uuid, delta)
                .await?
            {
                Adjustment::Applied(remaining) => {
                    debug!(product_uuid = %item.product_uuid, remaining, "reserved stock");
                }
                Adjustment::Insufficient => {
                    return Err(CheckoutServiceError::OutOfStock {
                        requested: item.quantity,
                    });
                }
                Adjustment::Missing => {
                    return Err(CheckoutServiceError::NotFound(Entity::Inventory));
                }
            }

            let line = LineItem::from_product(&product, item.quantity);

            total = line
                .line_total()
                .and_then(|amount| total.checked_add(amount))
                .filter(|amount| i64::try_from(*amount).is_ok())
                .ok_or_else(|| {
                    CheckoutServiceError::ValidationFailed("order total is too large".to_string())
                })?;

            lines.push(line);

            entries.push(NewInventoryTransaction {
                uuid: InventoryTransactionUuid::new(),
                product_uuid: item.product_uuid,
                action: InventoryAction::Sale,
                amount: item.quantity,
                note: note.to_string(),
                business_date,
            });
        }

        self.inventory.create_transactions(tx, &entries).await?;

        Ok(Reservation {
            lines,
            entries,
            total,
        })
    }

    /// Persist the pending order, payment and shipping, then open the hosted checkout.
    ///
    /// The gateway is called last so nothing after it can fail before commit.
    async fn open_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        buyer: UserRecord,
        draft: PaymentDraft,
    ) -> Result<PaymentIntent, CheckoutServiceError> {
        let order_code = generate_order_code();
        let order_uuid = OrderUuid::new();
        let payment_uuid = PaymentUuid::new();

        let items: SmallVec<[GatewayItem; 4]> = draft
            .lines
            .iter()
            .map(|line| GatewayItem {
                name: line.name.clone(),
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        self.orders
            .create_order(
                tx,
                NewOrder {
                    uuid: order_uuid,
                    user_uuid: buyer.uuid,
                    items: draft.lines,
                    total_amount: draft.total,
                    currency: draft.currency.clone(),
                    status: OrderStatus::Pending,
                    note: draft.note,
                },
            )
            .await?;

        self.payments
            .create_payment(
                tx,
                NewPayment {
                    uuid: payment_uuid,
                    user_uuid: buyer.uuid,
                    order_uuid,
                    transaction_id: order_code.to_string(),
                    amount: draft.total,
                    currency: draft.currency,
                    status: PaymentStatus::Pending,
                    method: self.gateway.method().to_string(),
                },
            )
            .await?;

        self.shipping
            .create_shipping(
                tx,
                NewShipping {
                    order_uuid,
                    delivery_code: order_code.to_string(),
                    shipping_unit: String::new(),
                    detail: draft.address.for_recipient(buyer.full_name),
                },
            )
            .await?;

        let link = self
            .gateway
            .create_checkout_session(CheckoutSession {
                order_code,
                amount: draft.total,
                description: order_code.to_string(),
                items,
                return_url: self.signer.callback_url(
                    &self.callbacks.success,
                    CallbackOutcome::Success,
                    payment_uuid,
                ),
                cancel_url: self.signer.callback_url(
                    &self.callbacks.cancel,
                    CallbackOutcome::Cancel,
                    payment_uuid,
                ),
            })
            .await?;

        Ok(PaymentIntent {
            checkout_url: link.checkout_url,
            order_uuid,
            payment_uuid,
            order_code,
        })
    }
}

impl Debug for PgCheckoutService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgCheckoutService")
            .field("db", &self.db)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

/// Reject empty selections and zero quantities, then merge repeated products.
fn prepare_items(items: &[SelectedItem]) -> Result<Vec<SelectedItem>, CheckoutServiceError> {
    if items.is_empty() {
        return Err(CheckoutServiceError::ValidationFailed(
            "no items selected".to_string(),
        ));
    }

    if items.iter().any(|item| item.quantity == 0) {
        return Err(CheckoutServiceError::ValidationFailed(
            "quantity must be greater than zero".to_string(),
        ));
    }

    merge_selected(items).ok_or_else(|| {
        CheckoutServiceError::ValidationFailed("selected quantity is too large".to_string())
    })
}

#[async_trait]
impl CheckoutService for PgCheckoutService {
    #[tracing::instrument(
        name = "checkout.service.create_order",
        skip(self, checkout),
        fields(
            user_uuid = %user,
            item_count = checkout.items.len(),
            order_uuid = tracing::field::Empty
        ),
        err
    )]
    async fn create_order(
        &self,
        user: UserUuid,
        checkout: CheckoutOrder,
    ) -> Result<OrderRecord, CheckoutServiceError> {
        let items = prepare_items(&checkout.items)?;

        self.identity.get_user(user).await?;

        let mut tx = self.db.begin_transaction().await?;

        let mut cart = self
            .carts
            .find_cart(&mut tx, user)
            .await?
            .ok_or(CheckoutServiceError::NotFound(Entity::Cart))?;

        let reservation = self.reserve(&mut tx, &items, &checkout.note).await?;

        for item in &items {
            take_quantity(&mut cart.items, item.product_uuid, item.quantity);
        }

        let remaining = self
            .carts
            .save_or_delete(&mut tx, user, &cart.items)
            .await?;

        let order = self
            .orders
            .create_order(
                &mut tx,
                NewOrder {
                    uuid: OrderUuid::new(),
                    user_uuid: user,
                    items: reservation.lines,
                    total_amount: reservation.total,
                    currency: DEFAULT_CURRENCY.to_string(),
                    status: OrderStatus::requested_or_pending(checkout.status.as_deref()),
                    note: checkout.note,
                },
            )
            .await?;

        tx.commit().await?;

        Span::current().record("order_uuid", tracing::field::display(order.uuid));

        info!(
            total_amount = order.total_amount,
            status = %order.status,
            sale_entries = reservation.entries.len(),
            cart_deleted = remaining.is_none(),
            "created order"
        );

        Ok(order)
    }

    #[tracing::instrument(
        name = "checkout.service.create_payment_through_cart",
        skip(self, payment),
        fields(
            user_uuid = %user,
            item_count = payment.items.len(),
            payment_uuid = tracing::field::Empty
        ),
        err
    )]
    async fn create_payment_through_cart(
        &self,
        user: UserUuid,
        payment: CartPayment,
    ) -> Result<PaymentIntent, CheckoutServiceError> {
        let items = prepare_items(&payment.items)?;

        let buyer = self.identity.get_user(user).await?;

        let mut tx = self.db.begin_transaction().await?;

        let mut cart = self
            .carts
            .find_cart(&mut tx, user)
            .await?
            .ok_or(CheckoutServiceError::NotFound(Entity::Cart))?;

        if items
            .iter()
            .any(|item| find_line(&cart.items, item.product_uuid).is_none())
        {
            return Err(CheckoutServiceError::NotFound(Entity::CartItem));
        }

        let reservation = self.reserve(&mut tx, &items, &payment.note).await?;

        for item in &items {
            take_quantity(&mut cart.items, item.product_uuid, item.quantity);
        }

        self.carts
            .save_or_delete(&mut tx, user, &cart.items)
            .await?;

        let intent = self
            .open_payment(
                &mut tx,
                buyer,
                PaymentDraft {
                    lines: reservation.lines,
                    total: reservation.total,
                    currency: DEFAULT_CURRENCY.to_string(),
                    note: payment.note,
                    address: payment.address,
                },
            )
            .await?;

        tx.commit().await?;

        Span::current().record("payment_uuid", tracing::field::display(intent.payment_uuid));

        info!(
            order_uuid = %intent.order_uuid,
            order_code = intent.order_code,
            total_amount = reservation.total,
            "created payment through cart"
        );

        Ok(intent)
    }

    #[tracing::instrument(
        name = "checkout.service.create_payment_direct",
        skip(self, payment),
        fields(
            user_uuid = %user,
            product_uuid = %payment.item.product_uuid,
            quantity = payment.item.quantity,
            payment_uuid = tracing::field::Empty
        ),
        err
    )]
    async fn create_payment_direct(
        &self,
        user: UserUuid,
        payment: DirectPayment,
    ) -> Result<PaymentIntent, CheckoutServiceError> {
        let items = prepare_items(&[payment.item])?;

        let buyer = self.identity.get_user(user).await?;

        let mut tx = self.db.begin_transaction().await?;

        let reservation = self.reserve(&mut tx, &items, &payment.note).await?;

        let currency = reservation
            .lines
            .first()
            .map_or_else(|| DEFAULT_CURRENCY.to_string(), |line| line.currency.clone());

        let total = reservation.total;

        let intent = self
            .open_payment(
                &mut tx,
                buyer,
                PaymentDraft {
                    lines: reservation.lines,
                    total,
                    currency,
                    note: payment.note,
                    address: payment.address,
                },
            )
            .await?;

        tx.commit().await?;

        Span::current().record("payment_uuid", tracing::field::display(intent.payment_uuid));

        info!(
            order_uuid = %intent.order_uuid,
            order_code = intent.order_code,
            total_amount = total,
            "created direct payment"
        );

        Ok(intent)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Check out selected items into an order, taking stock and trimming the cart.
    ///
    /// Items need not be in the cart; those that are get reduced or removed, and an emptied
    /// cart is deleted.
    async fn create_order(
        &self,
        user: UserUuid,
        checkout: CheckoutOrder,
    ) -> Result<OrderRecord, CheckoutServiceError>;

    /// Pay for cart lines through the hosted checkout.
    ///
    /// Every item must already be in the cart. Stock is taken now, not when the gateway
    /// confirms.
    async fn create_payment_through_cart(
        &self,
        user: UserUuid,
        payment: CartPayment,
    ) -> Result<PaymentIntent, CheckoutServiceError>;

    /// Pay for one product through the hosted checkout, bypassing the cart.
    async fn create_payment_direct(
        &self,
        user: UserUuid,
        payment: DirectPayment,
    ) -> Result<PaymentIntent, CheckoutServiceError>;
}
