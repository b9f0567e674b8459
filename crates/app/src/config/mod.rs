//! Application configuration
//!
//! Every setting can be given as a flag or through the environment; `.env` is loaded first.

use clap::Args;

mod callbacks;
mod db;
mod gateway;
mod logging;
mod mail;

pub use callbacks::CallbackConfig;
pub use db::DatabaseConfig;
pub use gateway::GatewayConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use mail::MailConfig;

/// Settings shared by every entry point.
#[derive(Debug, Args)]
pub struct AppConfig {
    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub gateway: GatewayConfig,

    #[command(flatten)]
    pub callbacks: CallbackConfig,

    #[command(flatten)]
    pub mail: MailConfig,
}

/// Load `.env` into the process environment if the file exists.
pub fn load_dotenv() {
    _ = dotenvy::dotenv();
}
