//! Payments

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::PaymentsServiceError;
pub(crate) use repository::PgPaymentsRepository;
pub use service::*;
