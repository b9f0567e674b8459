//! App Context

use std::sync::Arc;

use hmac::digest::InvalidLength;
use thiserror::Error;
use tracing::info;

use crate::{
    config::AppConfig,
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        checkout::{CheckoutService, PgCheckoutService},
        inventory::{InventoryService, PgInventoryService},
        orders::{OrdersService, PgOrdersService},
        payments::{PaymentsService, PgPaymentsService},
        products::{PgProductsService, ProductsService},
        settlement::{PgSettlementService, SettlementService},
        shipping::{PgShippingService, ShippingService},
    },
    gateway::{CallbackSigner, GatewayError, PayOsClient},
    identity::{IdentityProvider, PgIdentityProvider},
    mailer::{HttpMailer, Mailer, TracingMailer},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to build payment gateway client")]
    Gateway(#[source] GatewayError),

    #[error("callback secret cannot key a signature")]
    CallbackSecret(#[source] InvalidLength),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub inventory: Arc<dyn InventoryService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
    pub shipping: Arc<dyn ShippingService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub settlement: Arc<dyn SettlementService>,

    /// Mints signatures for callback URLs handed out by `checkout`.
    pub signer: CallbackSigner,
}

impl AppContext {
    /// Build application context from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the database is unreachable, the gateway client cannot be built
    /// or the callback secret is unusable.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(
            &config.database.database_url,
            config.database.database_max_connections,
        )
        .await
        .map_err(AppInitError::Database)?;

        let db = Db::new(pool.clone());

        let identity: Arc<dyn IdentityProvider> = Arc::new(PgIdentityProvider::new(pool));

        let gateway = PayOsClient::new(config.gateway.payos()).map_err(AppInitError::Gateway)?;

        let signer = CallbackSigner::new(&config.callbacks.callback_secret)
            .map_err(AppInitError::CallbackSecret)?;

        let mailer: Arc<dyn Mailer> = match config.mail.relay() {
            Some(relay) => Arc::new(HttpMailer::new(relay)),
            None => {
                info!("no mail relay configured; payment mails will be logged");

                Arc::new(TracingMailer)
            }
        };

        Ok(Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            inventory: Arc::new(PgInventoryService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone())),
            payments: Arc::new(PgPaymentsService::new(db.clone())),
            shipping: Arc::new(PgShippingService::new(db.clone())),
            checkout: Arc::new(PgCheckoutService::new(
                db.clone(),
                Arc::clone(&identity),
                Arc::new(gateway),
                signer.clone(),
                config.callbacks.process_urls(),
            )),
            settlement: Arc::new(PgSettlementService::new(
                db,
                identity,
                mailer,
                signer.clone(),
                config.callbacks.redirect_urls(),
            )),
            signer,
        })
    }
}
