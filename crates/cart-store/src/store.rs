//! The [`CartStore`] trait and the commands it commits.

use async_trait::async_trait;

use crate::{CartId, CartRecord, CustomerId, ItemRecord, ProductId, Result, StoredCart, Version};

/// Options for committing a batch of cart commands.
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    /// Expected version of the cart row for optimistic concurrency control.
    /// If None, no version check is performed (use with caution).
    pub expected_version: Option<Version>,
}

impl CommitOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the cart row to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the cart to not exist yet (new cart).
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// A single pending change to the cart collections.
///
/// The orchestrator decides which commands to issue based on its mutate
/// phase (insert vs. merge vs. delete); the store never infers changes
/// from tracked state.
#[derive(Debug, Clone)]
pub enum CartCommand {
    /// Insert or replace the cart row (voucher changes, lazy creation).
    UpsertCart(CartRecord),

    /// Insert or replace an item row, keyed by (cart, product).
    UpsertItem(ItemRecord),

    /// Delete an item row by product ID.
    DeleteItem {
        cart_id: CartId,
        product_id: ProductId,
    },
}

impl CartCommand {
    /// Returns the cart this command targets.
    pub fn cart_id(&self) -> CartId {
        match self {
            CartCommand::UpsertCart(record) => record.cart_id,
            CartCommand::UpsertItem(record) => record.cart_id,
            CartCommand::DeleteItem { cart_id, .. } => *cart_id,
        }
    }
}

/// Core trait for cart store implementations.
///
/// A store holds cart rows and item rows and commits pending changes
/// atomically. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Retrieves a customer's cart with its items.
    ///
    /// Returns None if the customer has no cart yet; absence is not an
    /// error at this layer.
    async fn find_cart(&self, customer_id: CustomerId) -> Result<Option<StoredCart>>;

    /// Commits a batch of commands atomically: either all succeed or
    /// none do.
    ///
    /// If `options.expected_version` is set, the operation fails with
    /// `ConcurrentModification` when the cart row's current version
    /// doesn't match. A batch that affects no rows fails with
    /// `NothingCommitted`.
    ///
    /// Returns the new version of the cart row after the commit.
    async fn commit(
        &self,
        cart_id: CartId,
        commands: Vec<CartCommand>,
        options: CommitOptions,
    ) -> Result<Version>;
}

/// Extension trait providing convenience methods for cart stores.
#[async_trait]
pub trait CartStoreExt: CartStore {
    /// Checks whether a customer already has a persisted cart.
    async fn cart_exists(&self, customer_id: CustomerId) -> Result<bool> {
        Ok(self.find_cart(customer_id).await?.is_some())
    }
}

impl<S: CartStore + ?Sized> CartStoreExt for S {}
