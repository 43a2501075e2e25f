//! Value objects for the cart domain.

use cart_store::ItemRecord;
use common::{CartId, ItemId, ProductId};
use serde::{Deserialize, Serialize};

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a dollar value.
    ///
    /// The cents portion is calculated as dollars * 100.
    pub fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Multiplies by a quantity, saturating at the `i64` bounds.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents.saturating_mul(quantity as i64),
        }
    }

    /// Multiplies by a quantity, or None if the result does not fit.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(quantity as i64)
            .map(|cents| Money { cents })
    }

    /// Returns the given percentage of this amount, truncated to cents
    /// and saturating at the `i64` bounds.
    pub fn percent(&self, percentage: u32) -> Money {
        let cents = (self.cents as i128) * (percentage as i128) / 100;
        Money {
            cents: cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

// Arithmetic saturates rather than wrapping or panicking: inputs come
// straight off the wire, and the aggregate rejects any line whose exact
// total does not fit before it is accepted into a cart.
impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_sub(rhs.cents),
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents = self.cents.saturating_add(rhs.cents);
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents = self.cents.saturating_sub(rhs.cents);
    }
}

/// An item in a shopping cart.
///
/// Name, image and price are a denormalized snapshot of catalog data
/// taken when the item was added; the catalog service is never consulted
/// again for the cart's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Identity of the stored item row.
    pub id: ItemId,

    /// The product identifier; unique within a cart.
    pub product_id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Product image URL.
    pub image: String,

    /// Price per unit in cents.
    pub unit_price: Money,

    /// Units of this product in the cart.
    pub quantity: u32,
}

impl CartItem {
    /// Creates a new cart item with a fresh row identity.
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        image: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            id: ItemId::new(),
            product_id: product_id.into(),
            name: name.into(),
            image: image.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns the total price for this item (quantity * unit_price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// Rebuilds the item from its persisted row.
    pub fn from_record(record: &ItemRecord) -> Self {
        Self {
            id: record.item_id,
            product_id: record.product_id.clone(),
            name: record.product_name.clone(),
            image: record.image_url.clone(),
            unit_price: Money::from_cents(record.unit_price_cents),
            quantity: record.quantity.max(0) as u32,
        }
    }

    /// Converts the item into its persisted row shape.
    pub fn to_record(&self, cart_id: CartId) -> ItemRecord {
        ItemRecord {
            item_id: self.id,
            cart_id,
            product_id: self.product_id.clone(),
            product_name: self.name.clone(),
            image_url: self.image.clone(),
            unit_price_cents: self.unit_price.cents(),
            quantity: self.quantity as i32,
        }
    }
}
