//! Test Helpers

use jiff::Zoned;
use sqlx::query;
use testresult::TestResult;

use crate::{
    domain::{
        inventory::{
            InventoryService,
            data::{InventoryAction, NewInventoryTransaction},
            records::InventoryTransactionUuid,
        },
        line_items::LineItem,
        orders::{
            OrdersServiceError, PgOrdersRepository,
            data::{DEFAULT_CURRENCY, NewOrder, OrderStatus},
            records::{OrderRecord, OrderUuid},
        },
        payments::{
            data::{NewPayment, PaymentStatus},
            records::PaymentUuid,
        },
        products::{
            ProductsService,
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
        shipping::data::DeliveryAddress,
    },
    gateway::PAYOS_METHOD,
    identity::{UserRecord, UserUuid},
    test::TestContext,
};

/// Insert a buyer the identity provider can resolve.
pub(crate) async fn create_user(ctx: &TestContext, full_name: &str) -> TestResult<UserRecord> {
    let uuid = UserUuid::new();

    let user = UserRecord {
        uuid,
        email: format!("{}@sonit.test", uuid.into_uuid().simple()),
        full_name: full_name.to_string(),
        role_uuid: None,
    };

    query("INSERT INTO users (uuid, email, full_name) VALUES ($1, $2, $3)")
        .bind(user.uuid.into_uuid())
        .bind(&user.email)
        .bind(&user.full_name)
        .execute(ctx.db.pool())
        .await?;

    Ok(user)
}

/// Create a product priced in the default currency with `quantity` units in stock.
pub(crate) async fn create_stocked_product(
    ctx: &TestContext,
    price: u64,
    quantity: i64,
) -> TestResult<ProductRecord> {
    let uuid = ProductUuid::new();

    let product = ctx
        .products
        .create_product(NewProduct {
            uuid,
            name: format!("Product {}", uuid.into_uuid().simple()),
            image_url: "https://img.sonit.test/product.png".to_string(),
            price,
            currency: DEFAULT_CURRENCY.to_string(),
        })
        .await?;

    ctx.inventory.set_inventory(product.uuid, quantity).await?;

    Ok(product)
}

pub(crate) fn inventory_entry(
    product: ProductUuid,
    action: InventoryAction,
    amount: u32,
) -> NewInventoryTransaction {
    NewInventoryTransaction {
        uuid: InventoryTransactionUuid::new(),
        product_uuid: product,
        action,
        amount,
        note: format!("{action} of {amount}"),
        business_date: Zoned::now().date(),
    }
}

/// Store a pending single-line order without touching stock.
pub(crate) async fn create_order(
    ctx: &TestContext,
    user: UserUuid,
    product: &ProductRecord,
    quantity: u32,
) -> Result<OrderRecord, OrdersServiceError> {
    let line = LineItem::from_product(product, quantity);

    let total_amount = line
        .line_total()
        .ok_or_else(|| OrdersServiceError::ValidationFailed("line total overflow".to_string()))?;

    let mut tx = ctx.db.pool().begin().await?;

    let order = PgOrdersRepository::new()
        .create_order(
            &mut tx,
            NewOrder {
                uuid: OrderUuid::new(),
                user_uuid: user,
                items: vec![line],
                total_amount,
                currency: DEFAULT_CURRENCY.to_string(),
                status: OrderStatus::Pending,
                note: String::new(),
            },
        )
        .await?;

    tx.commit().await?;

    Ok(order)
}

/// A pending gateway payment covering the whole order.
pub(crate) fn pending_payment(order: &OrderRecord) -> NewPayment {
    let uuid = PaymentUuid::new();

    NewPayment {
        uuid,
        user_uuid: order.user_uuid,
        order_uuid: order.uuid,
        transaction_id: uuid.into_uuid().simple().to_string(),
        amount: order.total_amount,
        currency: order.currency.clone(),
        status: PaymentStatus::Pending,
        method: PAYOS_METHOD.to_string(),
    }
}

pub(crate) fn delivery_address() -> DeliveryAddress {
    DeliveryAddress {
        address: "12 Ly Thuong Kiet".to_string(),
        city: "Hanoi".to_string(),
        country: "Vietnam".to_string(),
        phone_number: "0901234567".to_string(),
    }
}
