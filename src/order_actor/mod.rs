//! Order entity: a header plus the line items it owns.

mod actions;
pub mod entity;

pub use actions::*;
