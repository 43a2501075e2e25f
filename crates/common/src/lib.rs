//! Shared identifier types used across the shopping-cart service.

mod types;

pub use types::{CartId, CustomerId, ItemId, ProductId};
