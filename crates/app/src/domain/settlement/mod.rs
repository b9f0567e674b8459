//! Settlement

pub mod data;
pub mod errors;
mod retry;
pub mod service;

pub use errors::SettlementServiceError;
pub use retry::READ_ATTEMPTS;
pub use service::*;
