//! Shipping

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::ShippingServiceError;
pub(crate) use repository::PgShippingRepository;
pub use service::*;
