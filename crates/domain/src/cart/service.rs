//! Cart service orchestrating one mutation per request.
//!
//! Every mutation follows the same pipeline: resolve the customer's
//! cart, bind the target, apply the aggregate operation, re-validate,
//! and commit atomically; persistence is reached only when the
//! request-scoped [`ErrorAccumulator`] is empty.

use cart_store::{CartCommand, CartStore, CommitOptions, StoreError};
use chrono::Utc;
use common::CustomerId;

use crate::accumulator::ErrorAccumulator;
use crate::error::DomainError;

use super::{
    AddItemToCart, ApplyVoucherToCart, CartError, RemoveCartItem, ShoppingCart, UpdateCartItem,
};

/// Service for managing shopping carts.
///
/// Holds the persistence gateway; all request-scoped state (the cart
/// being mutated, the error accumulator) lives inside each call.
pub struct CartService<S: CartStore> {
    store: S,
}

impl<S: CartStore> CartService<S> {
    /// Creates a new cart service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads a customer's current cart.
    ///
    /// A customer without a persisted cart gets an empty, unpersisted
    /// one; absence is not an error for reads.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, customer_id: CustomerId) -> Result<ShoppingCart, DomainError> {
        match self.load(customer_id).await? {
            Some(cart) => Ok(cart),
            None => Ok(ShoppingCart::create(customer_id)),
        }
    }

    /// Adds an item to a customer's cart, creating the cart on first use.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id, product_id = %cmd.item.product_id))]
    pub async fn add_item(&self, cmd: AddItemToCart) -> Result<ShoppingCart, DomainError> {
        let mut errors = ErrorAccumulator::new();

        // ResolveCart: absence is fine here, the cart is created lazily.
        let existing = self.load(cmd.customer_id).await?;
        let is_new_cart = existing.is_none();
        let mut cart = existing.unwrap_or_else(|| ShoppingCart::create(cmd.customer_id));
        let product_id = cmd.item.product_id.clone();

        // Mutate
        match cart.add_item(cmd.item) {
            Ok(outcome) => tracing::debug!(?outcome, "item added"),
            Err(error) => errors.push(error),
        }

        // ValidateAggregate
        errors.extend(cart.validate());
        if !errors.is_empty() {
            return Err(self.reject("add_item", errors));
        }

        // Persist: the item row either way; the cart row only on creation.
        let mut commands = Vec::new();
        if is_new_cart {
            commands.push(CartCommand::UpsertCart(cart.to_record()?));
        }
        if let Some(item) = cart.item(&product_id) {
            commands.push(CartCommand::UpsertItem(item.to_record(cart.id())));
        }

        self.commit("add_item", cart, commands, is_new_cart, errors)
            .await
    }

    /// Replaces the quantity of an item already in a customer's cart.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id, product_id = %cmd.target))]
    pub async fn update_item(&self, cmd: UpdateCartItem) -> Result<ShoppingCart, DomainError> {
        let mut errors = ErrorAccumulator::new();

        // ResolveCart: updates require an existing cart.
        let Some(mut cart) = self.load(cmd.customer_id).await? else {
            errors.push(CartError::CartNotFound {
                customer_id: cmd.customer_id,
            });
            return Err(self.reject("update_item", errors));
        };

        // BindTarget: path and body must name the same product.
        if cmd.target != cmd.product_id {
            errors.push(CartError::IdentityMismatch {
                expected: cmd.target,
                actual: cmd.product_id,
            });
            return Err(self.reject("update_item", errors));
        }

        // Mutate
        if let Err(error) = cart.update_quantity(&cmd.product_id, cmd.new_quantity) {
            errors.push(error);
        }

        // ValidateAggregate
        errors.extend(cart.validate());
        if !errors.is_empty() {
            return Err(self.reject("update_item", errors));
        }

        let mut commands = Vec::new();
        if let Some(item) = cart.item(&cmd.product_id) {
            commands.push(CartCommand::UpsertItem(item.to_record(cart.id())));
        }

        self.commit("update_item", cart, commands, false, errors)
            .await
    }

    /// Removes an item from a customer's cart.
    ///
    /// Removing the last item leaves the cart persisted empty.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id, product_id = %cmd.product_id))]
    pub async fn remove_item(&self, cmd: RemoveCartItem) -> Result<ShoppingCart, DomainError> {
        let mut errors = ErrorAccumulator::new();

        let Some(mut cart) = self.load(cmd.customer_id).await? else {
            errors.push(CartError::CartNotFound {
                customer_id: cmd.customer_id,
            });
            return Err(self.reject("remove_item", errors));
        };

        // Mutate: a missing item short-circuits; no delete is issued.
        if let Err(error) = cart.remove_item(&cmd.product_id) {
            errors.push(error);
        }

        errors.extend(cart.validate());
        if !errors.is_empty() {
            return Err(self.reject("remove_item", errors));
        }

        let commands = vec![CartCommand::DeleteItem {
            cart_id: cart.id(),
            product_id: cmd.product_id,
        }];

        self.commit("remove_item", cart, commands, false, errors)
            .await
    }

    /// Applies a discount voucher to a customer's cart.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id, voucher = %cmd.voucher.code))]
    pub async fn apply_voucher(&self, cmd: ApplyVoucherToCart) -> Result<ShoppingCart, DomainError> {
        let mut errors = ErrorAccumulator::new();

        let Some(mut cart) = self.load(cmd.customer_id).await? else {
            errors.push(CartError::CartNotFound {
                customer_id: cmd.customer_id,
            });
            return Err(self.reject("apply_voucher", errors));
        };

        // Mutate: eligibility is the policy's call; rejection leaves the
        // cart untouched.
        if let Err(error) = cart.apply_voucher(cmd.voucher, Utc::now(), cmd.first_use_consumed) {
            errors.push(error);
        }

        errors.extend(cart.validate());
        if !errors.is_empty() {
            return Err(self.reject("apply_voucher", errors));
        }

        let commands = vec![CartCommand::UpsertCart(cart.to_record()?)];

        self.commit("apply_voucher", cart, commands, false, errors)
            .await
    }

    async fn load(&self, customer_id: CustomerId) -> Result<Option<ShoppingCart>, DomainError> {
        let stored = self.store.find_cart(customer_id).await?;
        stored
            .map(|stored| ShoppingCart::from_stored(stored).map_err(DomainError::from))
            .transpose()
    }

    /// Commits the batch, gated on the accumulator being empty.
    ///
    /// `NothingCommitted` from the store becomes a post-hoc
    /// `PersistenceFailure` rejection; any other store error propagates
    /// as-is (a version conflict is the caller's signal to resubmit).
    async fn commit(
        &self,
        operation: &'static str,
        mut cart: ShoppingCart,
        commands: Vec<CartCommand>,
        is_new_cart: bool,
        mut errors: ErrorAccumulator,
    ) -> Result<ShoppingCart, DomainError> {
        debug_assert!(errors.is_empty());

        let options = if is_new_cart {
            CommitOptions::expect_new()
        } else {
            CommitOptions::expect_version(cart.version())
        };

        match self.store.commit(cart.id(), commands, options).await {
            Ok(version) => {
                cart.set_version(version);
                metrics::counter!("cart_mutations_total", "operation" => operation).increment(1);
                Ok(cart)
            }
            Err(StoreError::NothingCommitted { cart_id }) => {
                tracing::warn!(%cart_id, operation, "commit affected no rows");
                errors.push(CartError::PersistenceFailure);
                Err(self.reject(operation, errors))
            }
            Err(error) => Err(error.into()),
        }
    }

    fn reject(&self, operation: &'static str, errors: ErrorAccumulator) -> DomainError {
        metrics::counter!("cart_rejections_total", "operation" => operation).increment(1);
        tracing::debug!(operation, violations = errors.len(), "request rejected");
        DomainError::rejected(errors)
    }
}
