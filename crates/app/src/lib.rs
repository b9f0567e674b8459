//! Inventory-consistent order and payment core.
//!
//! Carts, stock, orders, payments and shipping live in PostgreSQL; checkout and payment
//! settlement move them together inside one transaction per request.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod identity;
pub mod mailer;
pub mod observability;

#[cfg(test)]
mod test;

mod uuids;
