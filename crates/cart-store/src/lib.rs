//! Persistence gateway for the shopping-cart service.
//!
//! Exposes an abstract [`CartStore`] with two backends:
//! - [`InMemoryCartStore`] for tests and local development
//! - [`PostgresCartStore`] backed by sqlx
//!
//! A store holds two collections (cart rows and item rows) and commits a
//! batch of pending changes atomically, with an optimistic-concurrency
//! version check on the cart row.

mod error;
mod memory;
mod postgres;
mod record;
pub mod store;

pub use common::{CartId, CustomerId, ItemId, ProductId};
pub use error::{Result, StoreError};
pub use memory::InMemoryCartStore;
pub use postgres::PostgresCartStore;
pub use record::{CartRecord, ItemRecord, StoredCart, Version};
pub use store::{CartCommand, CartStore, CartStoreExt, CommitOptions};
