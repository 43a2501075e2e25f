use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    CartId, CustomerId, Result, StoreError, StoredCart, Version,
    store::{CartCommand, CartStore, CommitOptions},
};

/// In-memory cart store implementation for testing and local development.
///
/// Provides the same interface and concurrency semantics as the
/// PostgreSQL implementation, including the version check at commit.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<CustomerId, StoredCart>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of carts stored.
    pub async fn cart_count(&self) -> usize {
        self.carts.read().await.len()
    }

    /// Clears all carts.
    pub async fn clear(&self) {
        self.carts.write().await.clear();
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn find_cart(&self, customer_id: CustomerId) -> Result<Option<StoredCart>> {
        Ok(self.carts.read().await.get(&customer_id).cloned())
    }

    async fn commit(
        &self,
        cart_id: CartId,
        commands: Vec<CartCommand>,
        options: CommitOptions,
    ) -> Result<Version> {
        if commands.is_empty() {
            return Err(StoreError::NothingCommitted { cart_id });
        }

        let mut carts = self.carts.write().await;

        let current_version = carts
            .values()
            .find(|stored| stored.cart.cart_id == cart_id)
            .map(|stored| stored.version)
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(StoreError::ConcurrentModification {
                cart_id,
                expected,
                actual: current_version,
            });
        }

        let new_version = current_version.next();
        let mut affected = 0usize;

        // Mutate a staged copy so a failing command cannot leave a
        // half-applied batch behind, matching the transactional
        // all-or-nothing behavior of the PostgreSQL implementation.
        let mut staged = carts.clone();

        for command in commands {
            match command {
                CartCommand::UpsertCart(record) => {
                    let customer_id = record.customer_id;
                    match staged.get_mut(&customer_id) {
                        Some(stored) => stored.cart = record,
                        None => {
                            staged.insert(
                                customer_id,
                                StoredCart {
                                    cart: record,
                                    items: Vec::new(),
                                    version: current_version,
                                },
                            );
                        }
                    }
                    affected += 1;
                }
                CartCommand::UpsertItem(record) => {
                    let Some(stored) = staged
                        .values_mut()
                        .find(|stored| stored.cart.cart_id == record.cart_id)
                    else {
                        return Err(StoreError::NothingCommitted { cart_id });
                    };
                    match stored
                        .items
                        .iter_mut()
                        .find(|item| item.product_id == record.product_id)
                    {
                        Some(item) => *item = record,
                        None => stored.items.push(record),
                    }
                    affected += 1;
                }
                CartCommand::DeleteItem {
                    cart_id: target,
                    product_id,
                } => {
                    let Some(stored) = staged
                        .values_mut()
                        .find(|stored| stored.cart.cart_id == target)
                    else {
                        return Err(StoreError::NothingCommitted { cart_id });
                    };
                    let before = stored.items.len();
                    stored.items.retain(|item| item.product_id != product_id);
                    affected += before - stored.items.len();
                }
            }
        }

        if affected == 0 {
            return Err(StoreError::NothingCommitted { cart_id });
        }

        if let Some(stored) = staged
            .values_mut()
            .find(|stored| stored.cart.cart_id == cart_id)
        {
            stored.version = new_version;
        }

        *carts = staged;
        Ok(new_version)
    }
}
