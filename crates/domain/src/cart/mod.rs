//! Shopping cart aggregate and related types.

mod aggregate;
mod commands;
mod service;
mod value_objects;
mod voucher;

pub use aggregate::{AddOutcome, MAX_ITEM_QUANTITY, MIN_ITEM_QUANTITY, ShoppingCart};
pub use commands::{AddItemToCart, ApplyVoucherToCart, RemoveCartItem, UpdateCartItem};
pub use service::CartService;
pub use value_objects::{CartItem, Money};
pub use voucher::{DiscountType, Voucher, VoucherPolicy};

use chrono::{DateTime, Utc};
use common::{CustomerId, ProductId};
use thiserror::Error;

/// Business errors a cart mutation can raise.
///
/// These are accumulated per request rather than aborting the pipeline,
/// so a client receives every violated rule in one response.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantity outside the allowed per-item range.
    #[error(
        "Invalid quantity for product {product_id}: {quantity} (must be between {MIN_ITEM_QUANTITY} and {MAX_ITEM_QUANTITY})"
    )]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    /// Negative unit price, or a line total that does not fit in cents.
    #[error("Invalid price for product {product_id}: {price}")]
    InvalidPrice { product_id: ProductId, price: Money },

    /// The customer has no cart yet and the operation requires one.
    #[error("No cart found for customer {customer_id}")]
    CartNotFound { customer_id: CustomerId },

    /// Item not found in the cart.
    #[error("Item not found: {product_id}")]
    ItemNotFound { product_id: ProductId },

    /// The path and body disagree about which product is targeted.
    #[error("Item identity mismatch: path refers to {expected}, body refers to {actual}")]
    IdentityMismatch {
        expected: ProductId,
        actual: ProductId,
    },

    /// The voucher is not active.
    #[error("Voucher {code} is not active")]
    VoucherInactive { code: String },

    /// The voucher has expired.
    #[error("Voucher {code} expired at {expired_at}")]
    VoucherExpired {
        code: String,
        expired_at: DateTime<Utc>,
    },

    /// A first-time-use voucher has already been consumed.
    #[error("Voucher {code} is limited to first-time use and has already been used")]
    FirstUseAlreadyConsumed { code: String },

    /// The discount exceeds the pre-discount cart amount.
    #[error("Cart discount {discount} exceeds cart amount {amount}")]
    AmountBelowDiscount { amount: Money, discount: Money },

    /// The commit reported no effect.
    #[error("The cart could not be persisted")]
    PersistenceFailure,
}

impl CartError {
    /// Returns true for errors that describe a missing cart or item,
    /// used by the HTTP layer to pick a 404 over a 400.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CartError::CartNotFound { .. } | CartError::ItemNotFound { .. }
        )
    }
}
