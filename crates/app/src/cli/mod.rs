use clap::{Parser, Subcommand};
use sonit_app::{config::AppConfig, context::AppContext};

mod db;
mod inventory;
mod payment;
mod product;

#[derive(Debug, Parser)]
#[command(name = "sonit-app", about = "Sonit order and payment CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Product(product::ProductCommand),
    Inventory(inventory::InventoryCommand),
    Payment(payment::PaymentCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command, &self.config).await,
            Commands::Product(command) => product::run(command, &context(&self.config).await?).await,
            Commands::Inventory(command) => {
                inventory::run(command, &context(&self.config).await?).await
            }
            Commands::Payment(command) => payment::run(command, &context(&self.config).await?).await,
        }
    }
}

async fn context(config: &AppConfig) -> Result<AppContext, String> {
    AppContext::from_config(config)
        .await
        .map_err(|error| format!("failed to initialise application: {error}"))
}
