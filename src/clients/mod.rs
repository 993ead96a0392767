//! Typed clients over the resource actors.

#[macro_use]
mod macros;

pub mod order_client;
pub mod partner_client;
pub mod product_client;

pub use order_client::OrderClient;
pub use partner_client::PartnerClient;
pub use product_client::ProductClient;
