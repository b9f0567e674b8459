//! Inventory ledger service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        inventory::{
            data::{InventoryTransactionUpdate, NewInventoryTransaction},
            errors::InventoryServiceError,
            records::{InventoryRecord, InventoryTransactionRecord, InventoryTransactionUuid},
            repository::{Adjustment, PgInventoryRepository},
        },
        pagination::Page,
        products::{PgProductsRepository, records::ProductUuid},
    },
    errors::{Entity, EntityError},
};

#[derive(Debug, Clone)]
pub struct PgInventoryService {
    db: Db,
    inventory: PgInventoryRepository,
    products: PgProductsRepository,
}

impl PgInventoryService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            inventory: PgInventoryRepository::new(),
            products: PgProductsRepository::new(),
        }
    }

    async fn ensure_product(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product: ProductUuid,
    ) -> Result<(), InventoryServiceError> {
        self.products
            .get_product(tx, product)
            .await
            .map_err(InventoryServiceError::missing(Entity::Product))?;

        Ok(())
    }

    async fn apply(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product: ProductUuid,
        delta: i64,
        requested: u32,
    ) -> Result<i64, InventoryServiceError> {
        match self.inventory.adjust_quantity(tx, product, delta).await? {
            Adjustment::Applied(quantity) => Ok(quantity),
            Adjustment::Insufficient => Err(InventoryServiceError::OutOfStock { requested }),
            Adjustment::Missing => Err(InventoryServiceError::NotFound(Entity::Inventory)),
        }
    }
}

fn require_positive(amount: u32) -> Result<(), InventoryServiceError> {
    if amount == 0 {
        return Err(InventoryServiceError::ValidationFailed(
            "amount must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

#[async_trait]
impl InventoryService for PgInventoryService {
    async fn get_inventory(
        &self,
        product: ProductUuid,
    ) -> Result<InventoryRecord, InventoryServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let inventory = self.inventory.get_inventory(&mut tx, product).await?;

        tx.commit().await?;

        Ok(inventory)
    }

    #[tracing::instrument(
        name = "inventory.service.set_inventory",
        skip(self),
        fields(product_uuid = %product),
        err
    )]
    async fn set_inventory(
        &self,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<InventoryRecord, InventoryServiceError> {
        if quantity < 0 {
            return Err(InventoryServiceError::ValidationFailed(
                "quantity cannot be negative".to_string(),
            ));
        }

        let mut tx = self.db.begin_transaction().await?;

        self.ensure_product(&mut tx, product).await?;

        let inventory = self
            .inventory
            .create_inventory(&mut tx, product, quantity)
            .await?;

        tx.commit().await?;

        info!(product_uuid = %product, quantity, "created inventory");

        Ok(inventory)
    }

    #[tracing::instrument(
        name = "inventory.service.record_transaction",
        skip(self, entry),
        fields(
            product_uuid = %entry.product_uuid,
            action = %entry.action,
            amount = entry.amount,
            quantity = tracing::field::Empty
        ),
        err
    )]
    async fn record_transaction(
        &self,
        entry: NewInventoryTransaction,
    ) -> Result<InventoryTransactionRecord, InventoryServiceError> {
        require_positive(entry.amount)?;

        let mut tx = self.db.begin_transaction().await?;

        self.ensure_product(&mut tx, entry.product_uuid).await?;

        let quantity = self
            .apply(
                &mut tx,
                entry.product_uuid,
                entry.action.signed_amount(entry.amount),
                entry.amount,
            )
            .await?;

        Span::current().record("quantity", quantity);

        let record = self.inventory.create_transaction(&mut tx, entry).await?;

        tx.commit().await?;

        info!(transaction_uuid = %record.uuid, quantity, "recorded inventory transaction");

        Ok(record)
    }

    async fn get_transaction(
        &self,
        transaction: InventoryTransactionUuid,
    ) -> Result<InventoryTransactionRecord, InventoryServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .inventory
            .get_transaction(&mut tx, transaction)
            .await
            .map_err(InventoryServiceError::missing(Entity::InventoryTransaction))?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_transactions(
        &self,
        product: ProductUuid,
        page: u32,
    ) -> Result<Page<InventoryTransactionRecord>, InventoryServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let (entries, total) = self
            .inventory
            .list_transactions_by_product(&mut tx, product, page)
            .await?;

        tx.commit().await?;

        Ok(Page::new(entries, page, total))
    }

    #[tracing::instrument(
        name = "inventory.service.update_transaction",
        skip(self, update),
        fields(
            transaction_uuid = %transaction,
            original_action = tracing::field::Empty,
            action = %update.action,
            amount = update.amount
        ),
        err
    )]
    async fn update_transaction(
        &self,
        transaction: InventoryTransactionUuid,
        update: InventoryTransactionUpdate,
    ) -> Result<InventoryTransactionRecord, InventoryServiceError> {
        require_positive(update.amount)?;

        let mut tx = self.db.begin_transaction().await?;

        let original = self
            .inventory
            .get_transaction(&mut tx, transaction)
            .await
            .map_err(InventoryServiceError::missing(Entity::InventoryTransaction))?;

        Span::current().record("original_action", tracing::field::display(original.action));

        let reversal = original.action.reverse_sign(original.amount);
        let application = update.action.signed_amount(update.amount);

        if original.product_uuid == update.product_uuid {
            self.apply(
                &mut tx,
                original.product_uuid,
                reversal + application,
                update.amount,
            )
            .await?;
        } else {
            self.ensure_product(&mut tx, update.product_uuid).await?;

            self.apply(&mut tx, original.product_uuid, reversal, original.amount)
                .await?;

            self.apply(&mut tx, update.product_uuid, application, update.amount)
                .await?;
        }

        let note = update.note.clone().unwrap_or(original.note);

        let record = self
            .inventory
            .update_transaction(&mut tx, transaction, &update, &note)
            .await?;

        tx.commit().await?;

        info!(
            transaction_uuid = %record.uuid,
            reversed = reversal,
            applied = application,
            "updated inventory transaction"
        );

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Current stock for a product.
    async fn get_inventory(
        &self,
        product: ProductUuid,
    ) -> Result<InventoryRecord, InventoryServiceError>;

    /// Create the inventory row for a product with its opening quantity.
    async fn set_inventory(
        &self,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<InventoryRecord, InventoryServiceError>;

    /// Append a ledger entry and apply its signed amount to stock.
    async fn record_transaction(
        &self,
        entry: NewInventoryTransaction,
    ) -> Result<InventoryTransactionRecord, InventoryServiceError>;

    async fn get_transaction(
        &self,
        transaction: InventoryTransactionUuid,
    ) -> Result<InventoryTransactionRecord, InventoryServiceError>;

    /// Ledger entries for a product, newest first.
    async fn list_transactions(
        &self,
        product: ProductUuid,
        page: u32,
    ) -> Result<Page<InventoryTransactionRecord>, InventoryServiceError>;

    /// Amend an entry: undo the original movement, then apply the amended one.
    async fn update_transaction(
        &self,
        transaction: InventoryTransactionUuid,
        update: InventoryTransactionUpdate,
    ) -> Result<InventoryTransactionRecord, InventoryServiceError>;
}
