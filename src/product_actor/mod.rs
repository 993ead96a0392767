//! Product entity served by a resource actor, including the stock actions.

mod actions;
pub mod entity;

pub use actions::*;
