//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            data::CartItemRequest, errors::CartsServiceError, records::CartRecord,
            repository::PgCartsRepository,
        },
        inventory::PgInventoryRepository,
        line_items::{LineItem, find_line, find_line_mut, remove_line},
        pagination::Page,
        products::{PgProductsRepository, records::ProductRecord, records::ProductUuid},
    },
    errors::{Entity, EntityError},
    identity::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts: PgCartsRepository,
    products: PgProductsRepository,
    inventory: PgInventoryRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts: PgCartsRepository::new(),
            products: PgProductsRepository::new(),
            inventory: PgInventoryRepository::new(),
        }
    }

    /// Load the product and check `quantity` against its current stock.
    async fn stocked_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<ProductRecord, CartsServiceError> {
        let record = self
            .products
            .get_product(tx, product)
            .await
            .map_err(CartsServiceError::missing(Entity::Product))?;

        let inventory = self
            .inventory
            .get_inventory(tx, product)
            .await
            .map_err(CartsServiceError::missing(Entity::Inventory))?;

        if i64::from(quantity) > inventory.quantity {
            return Err(CartsServiceError::OutOfStock {
                requested: quantity,
            });
        }

        Ok(record)
    }
}

fn require_quantity(quantity: u32) -> Result<(), CartsServiceError> {
    if quantity == 0 {
        return Err(CartsServiceError::ValidationFailed(
            "quantity must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, request),
        fields(
            user_uuid = %user,
            product_uuid = %request.product_uuid,
            quantity = request.quantity
        ),
        err
    )]
    async fn add_item(
        &self,
        user: UserUuid,
        request: CartItemRequest,
    ) -> Result<CartRecord, CartsServiceError> {
        require_quantity(request.quantity)?;

        let mut tx = self.db.begin_transaction().await?;

        self.carts.lock_cart(&mut tx, user).await?;

        let mut items = self
            .carts
            .find_cart(&mut tx, user)
            .await?
            .map(|cart| cart.items)
            .unwrap_or_default();

        let existing = find_line(&items, request.product_uuid).map_or(0, |line| line.quantity);

        let combined = existing.checked_add(request.quantity).ok_or_else(|| {
            CartsServiceError::ValidationFailed("cart quantity is too large".to_string())
        })?;

        let product = self
            .stocked_product(&mut tx, request.product_uuid, combined)
            .await?;

        match find_line_mut(&mut items, request.product_uuid) {
            Some(line) => line.quantity = combined,
            None => items.push(LineItem::from_product(&product, combined)),
        }

        let cart = self.carts.save_cart(&mut tx, user, &items).await?;

        tx.commit().await?;

        info!(line_count = cart.items.len(), quantity = combined, "added cart item");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.edit_item",
        skip(self, request),
        fields(
            user_uuid = %user,
            product_uuid = %request.product_uuid,
            quantity = request.quantity
        ),
        err
    )]
    async fn edit_item(
        &self,
        user: UserUuid,
        request: CartItemRequest,
    ) -> Result<CartRecord, CartsServiceError> {
        require_quantity(request.quantity)?;

        let mut tx = self.db.begin_transaction().await?;

        let mut cart = self
            .carts
            .find_cart(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound(Entity::Cart))?;

        if find_line(&cart.items, request.product_uuid).is_none() {
            return Err(CartsServiceError::NotFound(Entity::CartItem));
        }

        self.stocked_product(&mut tx, request.product_uuid, request.quantity)
            .await?;

        if let Some(line) = find_line_mut(&mut cart.items, request.product_uuid) {
            line.quantity = request.quantity;
        }

        let cart = self.carts.save_cart(&mut tx, user, &cart.items).await?;

        tx.commit().await?;

        info!("edited cart item");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn remove_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<Option<CartRecord>, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let mut cart = self
            .carts
            .find_cart(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound(Entity::Cart))?;

        if !remove_line(&mut cart.items, product) {
            return Err(CartsServiceError::NotFound(Entity::CartItem));
        }

        let cart = self.carts.save_or_delete(&mut tx, user, &cart.items).await?;

        tx.commit().await?;

        info!(cart_deleted = cart.is_none(), "removed cart item");

        Ok(cart)
    }

    async fn view_cart(
        &self,
        user: UserUuid,
        page: u32,
    ) -> Result<Page<LineItem>, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.find_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart.map_or_else(Page::empty, |cart| Page::slice(cart.items, page)))
    }

    async fn get_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self
            .carts
            .find_cart(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound(Entity::Cart))?;

        tx.commit().await?;

        Ok(cart)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Add units of a product, merging with an existing line.
    ///
    /// The merged quantity must fit in current stock. A missing cart is created.
    async fn add_item(
        &self,
        user: UserUuid,
        request: CartItemRequest,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Replace the quantity on an existing line.
    async fn edit_item(
        &self,
        user: UserUuid,
        request: CartItemRequest,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Drop a line. Returns `None` once the cart is empty and has been deleted.
    async fn remove_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<Option<CartRecord>, CartsServiceError>;

    /// One page of cart lines; a user without a cart sees an empty page.
    async fn view_cart(&self, user: UserUuid, page: u32)
    -> Result<Page<LineItem>, CartsServiceError>;

    async fn get_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::inventory::InventoryService,
        test::{
            TestContext,
            helpers::{create_stocked_product, create_user},
        },
    };

    use super::*;

    fn request(product: ProductUuid, quantity: u32) -> CartItemRequest {
        CartItemRequest {
            product_uuid: product,
            quantity,
        }
    }

    #[tokio::test]
    async fn add_item_creates_cart_with_product_snapshot() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Linh").await?;
        let product = create_stocked_product(&ctx, 25_000, 5).await?;

        let cart = ctx.carts.add_item(user.uuid, request(product.uuid, 2)).await?;

        assert_eq!(cart.user_uuid, user.uuid);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id, product.uuid);
        assert_eq!(cart.items[0].name, product.name);
        assert_eq!(cart.items[0].price, 25_000);
        assert_eq!(cart.items[0].quantity, 2);
        assert!(cart.expired_at > cart.created_at, "cart should expire later");

        Ok(())
    }

    #[tokio::test]
    async fn add_item_beyond_stock_reports_combined_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Minh").await?;
        let product = create_stocked_product(&ctx, 1000, 5).await?;

        let cart = ctx.carts.add_item(user.uuid, request(product.uuid, 3)).await?;

        assert_eq!(cart.items[0].quantity, 3);

        let result = ctx.carts.add_item(user.uuid, request(product.uuid, 4)).await;

        assert!(
            matches!(result, Err(CartsServiceError::OutOfStock { requested: 7 })),
            "expected OutOfStock(7), got {result:?}"
        );

        let cart = ctx.carts.get_cart(user.uuid).await?;

        assert_eq!(cart.items[0].quantity, 3, "rejected add must leave the line alone");
        assert_eq!(ctx.inventory.get_inventory(product.uuid).await?.quantity, 5);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_first_adds_keep_every_line() -> TestResult {
        let ctx = TestContext::new().await;

        for round in 0..10 {
            let user = create_user(&ctx, &format!("Racer {round}")).await?.uuid;
            let first = create_stocked_product(&ctx, 1000, 5).await?.uuid;
            let second = create_stocked_product(&ctx, 2000, 5).await?.uuid;

            let left = ctx.carts.clone();
            let right = ctx.carts.clone();

            let (a, b) = tokio::join!(
                tokio::spawn(async move { left.add_item(user, request(first, 1)).await }),
                tokio::spawn(async move { right.add_item(user, request(second, 2)).await }),
            );

            a??;
            b??;

            let cart = ctx.carts.get_cart(user).await?;

            assert_eq!(cart.items.len(), 2, "round {round} lost a line");
            assert_eq!(find_line(&cart.items, first).map(|line| line.quantity), Some(1));
            assert_eq!(find_line(&cart.items, second).map(|line| line.quantity), Some(2));
        }

        Ok(())
    }

    #[tokio::test]
    async fn add_item_zero_quantity_is_invalid() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Hoa").await?;
        let product = create_stocked_product(&ctx, 1000, 5).await?;

        let result = ctx.carts.add_item(user.uuid, request(product.uuid, 0)).await;

        assert!(
            matches!(result, Err(CartsServiceError::ValidationFailed(_))),
            "expected ValidationFailed, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_unknown_product_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Tuan").await?;

        let result = ctx
            .carts
            .add_item(user.uuid, request(ProductUuid::new(), 1))
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound(Entity::Product))),
            "expected NotFound(Product), got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn edit_item_replaces_quantity_within_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Lan").await?;
        let product = create_stocked_product(&ctx, 1000, 5).await?;

        ctx.carts.add_item(user.uuid, request(product.uuid, 1)).await?;

        let cart = ctx.carts.edit_item(user.uuid, request(product.uuid, 5)).await?;

        assert_eq!(cart.items[0].quantity, 5);

        let result = ctx.carts.edit_item(user.uuid, request(product.uuid, 6)).await;

        assert!(
            matches!(result, Err(CartsServiceError::OutOfStock { requested: 6 })),
            "expected OutOfStock(6), got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn edit_item_without_line_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Quang").await?;
        let in_cart = create_stocked_product(&ctx, 1000, 5).await?;
        let other = create_stocked_product(&ctx, 1000, 5).await?;

        let result = ctx.carts.edit_item(user.uuid, request(in_cart.uuid, 1)).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound(Entity::Cart))),
            "expected NotFound(Cart), got {result:?}"
        );

        ctx.carts.add_item(user.uuid, request(in_cart.uuid, 1)).await?;

        let result = ctx.carts.edit_item(user.uuid, request(other.uuid, 1)).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound(Entity::CartItem))),
            "expected NotFound(CartItem), got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn removing_last_item_deletes_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Duc").await?;
        let first = create_stocked_product(&ctx, 1000, 5).await?;
        let second = create_stocked_product(&ctx, 2000, 5).await?;

        ctx.carts.add_item(user.uuid, request(first.uuid, 1)).await?;
        ctx.carts.add_item(user.uuid, request(second.uuid, 1)).await?;

        let remaining = ctx.carts.remove_item(user.uuid, first.uuid).await?;

        assert_eq!(remaining.map(|cart| cart.items.len()), Some(1));

        let remaining = ctx.carts.remove_item(user.uuid, second.uuid).await?;

        assert!(remaining.is_none(), "empty cart should be deleted");

        let result = ctx.carts.get_cart(user.uuid).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound(Entity::Cart))),
            "expected NotFound(Cart), got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn view_cart_pages_lines_and_tolerates_missing_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "Mai").await?;

        let empty = ctx.carts.view_cart(user.uuid, 1).await?;

        assert!(empty.items.is_empty(), "missing cart should view as empty");

        for _ in 0..12 {
            let product = create_stocked_product(&ctx, 100, 1).await?;

            ctx.carts.add_item(user.uuid, request(product.uuid, 1)).await?;
        }

        let first = ctx.carts.view_cart(user.uuid, 0).await?;
        let second = ctx.carts.view_cart(user.uuid, 2).await?;

        assert_eq!(first.page_number, 1);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 2);
        assert_eq!(second.items.len(), 2);

        Ok(())
    }
}
