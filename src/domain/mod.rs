//! Business entities of the back office, free of any actor or storage concern.

pub mod draft;
pub mod kind;
pub mod order;
pub mod partner;
pub mod product;

pub use draft::*;
pub use kind::*;
pub use order::*;
pub use partner::*;
pub use product::*;

pub type ProductId = String;
pub type OrderId = String;
pub type PartnerId = String;
pub type BrandId = String;
pub type UserId = String;
