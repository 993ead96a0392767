//! Keeps product stock equal to the net effect of the persisted orders of a
//! small back office, across order create, update and delete.
//!
//! [`reconciler::OrderReconciler`] drives each mutation, [`sign`] decides the
//! direction of the stock movement and [`stock::StockAdjuster`] applies it
//! through an [`store::InventoryStore`].

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod order_actor;
pub mod partner_actor;
pub mod product_actor;
pub mod reconciler;
pub mod sign;
pub mod stats;
pub mod stock;
pub mod store;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod test_support;

pub use app_system::{setup_tracing, BackOfficeSystem};
pub use config::ReconcilerConfig;
pub use error::{ReconcileError, StockError, StoreError, ValidationError};
pub use reconciler::OrderReconciler;
pub use sign::StockSign;
