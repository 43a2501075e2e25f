//! Persistence records for carts and cart items.

use serde::{Deserialize, Serialize};

use crate::{CartId, CustomerId, ItemId, ProductId};

/// Version of a cart row, used for optimistic concurrency control.
///
/// Starts at 0 for a cart that has never been committed and increments
/// with every successful commit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) for a cart not yet persisted.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted state of a cart row.
///
/// The voucher is stored as an opaque JSON payload; the domain layer owns
/// its shape. Derived totals (amount, discount) are never stored; they
/// are recomputed from the item rows and the voucher on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartRecord {
    /// Unique cart identifier.
    pub cart_id: CartId,

    /// Owning customer; one active cart per customer.
    pub customer_id: CustomerId,

    /// Applied voucher snapshot, if any.
    pub voucher: Option<serde_json::Value>,
}

/// Persisted state of a single cart item row.
///
/// Name, image and price are a denormalized snapshot of catalog data
/// taken when the item was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Unique row identifier.
    pub item_id: ItemId,

    /// Back-reference to the owning cart.
    pub cart_id: CartId,

    /// Product identifier; unique within a cart.
    pub product_id: ProductId,

    /// Product name at add-time.
    pub product_name: String,

    /// Product image URL at add-time.
    pub image_url: String,

    /// Unit price in cents at add-time.
    pub unit_price_cents: i64,

    /// Units of this product in the cart.
    pub quantity: i32,
}

/// A cart row together with its item rows and current version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCart {
    /// The cart row.
    pub cart: CartRecord,

    /// Item rows in insertion order.
    pub items: Vec<ItemRecord>,

    /// Current optimistic-concurrency version.
    pub version: Version,
}
