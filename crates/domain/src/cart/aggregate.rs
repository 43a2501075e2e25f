//! Shopping cart aggregate implementation.

use cart_store::{CartRecord, StoredCart, Version};
use chrono::{DateTime, Utc};
use common::{CartId, CustomerId, ProductId};
use serde::{Deserialize, Serialize};

use super::{CartError, CartItem, Money, Voucher, VoucherPolicy};

/// Smallest quantity of a product a cart may hold.
pub const MIN_ITEM_QUANTITY: u32 = 1;

/// Largest quantity of a product a cart may hold.
pub const MAX_ITEM_QUANTITY: u32 = 15;

/// How an added item landed in the cart.
///
/// The orchestrator logs this and uses it to distinguish the "new stored
/// item" from the "existing stored item" persistence path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// No item with this product existed; a new one was inserted.
    Inserted,
    /// The product was already in the cart; quantities were merged.
    Merged,
}

/// Shopping cart aggregate root.
///
/// The consistency boundary around a customer's items, voucher, and
/// derived totals. `amount` and `discount` are recomputed after every
/// structural mutation and never stored independently of the items and
/// voucher that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingCart {
    /// Unique cart identifier.
    id: CartId,

    /// Customer who owns the cart.
    customer_id: CustomerId,

    /// Persisted row version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// Items in the cart, in insertion order, unique by product ID.
    items: Vec<CartItem>,

    /// Applied voucher, at most one at a time.
    voucher: Option<Voucher>,

    /// Derived: sum of item price × quantity.
    amount: Money,

    /// Derived: discount the voucher yields on `amount`.
    discount: Money,
}

impl ShoppingCart {
    /// Creates an empty cart for a customer.
    ///
    /// Carts are created lazily on the customer's first item addition;
    /// a freshly created cart has never been persisted.
    pub fn create(customer_id: CustomerId) -> Self {
        Self {
            id: CartId::new(),
            customer_id,
            version: Version::initial(),
            items: Vec::new(),
            voucher: None,
            amount: Money::zero(),
            discount: Money::zero(),
        }
    }

    /// Rebuilds the aggregate from its persisted rows.
    ///
    /// Totals are recomputed from the item rows and voucher snapshot;
    /// they are never read from storage.
    pub fn from_stored(stored: StoredCart) -> Result<Self, serde_json::Error> {
        let voucher = stored
            .cart
            .voucher
            .map(serde_json::from_value::<Voucher>)
            .transpose()?;

        let mut cart = Self {
            id: stored.cart.cart_id,
            customer_id: stored.cart.customer_id,
            version: stored.version,
            items: stored.items.iter().map(CartItem::from_record).collect(),
            voucher,
            amount: Money::zero(),
            discount: Money::zero(),
        };
        cart.recompute();
        Ok(cart)
    }

    /// Converts the cart into its persisted row shape.
    pub fn to_record(&self) -> Result<CartRecord, serde_json::Error> {
        let voucher = self
            .voucher
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        Ok(CartRecord {
            cart_id: self.id,
            customer_id: self.customer_id,
            voucher,
        })
    }
}

// Query methods
impl ShoppingCart {
    /// Returns the cart identifier.
    pub fn id(&self) -> CartId {
        self.id
    }

    /// Returns the owning customer.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the persisted row version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the persisted row version after a successful commit.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Returns the items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the number of distinct products in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true iff an item with the same product ID exists.
    pub fn has_item(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    /// Returns the item for a product, if present.
    pub fn item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Returns the pre-discount cart total.
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the discount the applied voucher yields.
    pub fn discount(&self) -> Money {
        self.discount
    }

    /// Returns the applied voucher, if any.
    pub fn voucher(&self) -> Option<&Voucher> {
        self.voucher.as_ref()
    }

    /// Returns true iff a voucher is applied.
    pub fn has_voucher(&self) -> bool {
        self.voucher.is_some()
    }
}

// Mutation methods (pure in-memory; persistence is the orchestrator's job)
impl ShoppingCart {
    /// Adds an item to the cart.
    ///
    /// If an item with the same product ID exists, quantities are merged
    /// and the bound check applies to the *resulting* quantity. A
    /// rejected add leaves the cart unchanged.
    pub fn add_item(&mut self, item: CartItem) -> Result<AddOutcome, CartError> {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            let merged = existing.quantity.saturating_add(item.quantity);
            check_quantity(&item.product_id, merged)?;
            check_line_total(&item.product_id, existing.unit_price, merged)?;
            existing.quantity = merged;
            self.recompute();
            Ok(AddOutcome::Merged)
        } else {
            check_quantity(&item.product_id, item.quantity)?;
            check_line_total(&item.product_id, item.unit_price, item.quantity)?;
            self.items.push(item);
            self.recompute();
            Ok(AddOutcome::Inserted)
        }
    }

    /// Replaces the quantity of an item already in the cart.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        new_quantity: u32,
    ) -> Result<(), CartError> {
        check_quantity(product_id, new_quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
            .ok_or_else(|| CartError::ItemNotFound {
                product_id: product_id.clone(),
            })?;

        check_line_total(product_id, item.unit_price, new_quantity)?;
        item.quantity = new_quantity;
        self.recompute();
        Ok(())
    }

    /// Removes an item from the cart, returning it.
    ///
    /// Removing the last item does not delete the cart itself; the cart
    /// persists empty.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<CartItem, CartError> {
        let position = self
            .items
            .iter()
            .position(|item| &item.product_id == product_id)
            .ok_or_else(|| CartError::ItemNotFound {
                product_id: product_id.clone(),
            })?;

        let removed = self.items.remove(position);
        self.recompute();
        Ok(removed)
    }

    /// Applies a voucher to the cart.
    ///
    /// Eligibility and discount amount are delegated to [`VoucherPolicy`];
    /// an ineligible voucher leaves the cart state untouched.
    pub fn apply_voucher(
        &mut self,
        voucher: Voucher,
        now: DateTime<Utc>,
        first_use_consumed: bool,
    ) -> Result<(), CartError> {
        VoucherPolicy::ensure_eligible(&voucher, now, first_use_consumed)?;

        self.voucher = Some(voucher);
        self.recompute();
        Ok(())
    }

    /// Runs the full rule set and returns every violated rule.
    ///
    /// An empty list means the aggregate is valid.
    pub fn validate(&self) -> Vec<CartError> {
        let mut violations = Vec::new();

        for item in &self.items {
            if !(MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&item.quantity) {
                violations.push(CartError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                });
            }
            if check_line_total(&item.product_id, item.unit_price, item.quantity).is_err() {
                violations.push(CartError::InvalidPrice {
                    product_id: item.product_id.clone(),
                    price: item.unit_price,
                });
            }
        }

        if self.amount < self.discount {
            violations.push(CartError::AmountBelowDiscount {
                amount: self.amount,
                discount: self.discount,
            });
        }

        violations
    }

    /// Recomputes the derived totals from items and voucher.
    fn recompute(&mut self) {
        self.amount = self
            .items
            .iter()
            .map(CartItem::total_price)
            .fold(Money::zero(), |total, price| total + price);
        self.discount = self
            .voucher
            .as_ref()
            .map(|voucher| VoucherPolicy::compute_discount(self.amount, voucher))
            .unwrap_or_else(Money::zero);
    }
}

fn check_quantity(product_id: &ProductId, quantity: u32) -> Result<(), CartError> {
    if !(MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&quantity) {
        return Err(CartError::InvalidQuantity {
            product_id: product_id.clone(),
            quantity,
        });
    }
    Ok(())
}

fn check_line_total(
    product_id: &ProductId,
    unit_price: Money,
    quantity: u32,
) -> Result<(), CartError> {
    if unit_price.cents() < 0 || unit_price.checked_multiply(quantity).is_none() {
        return Err(CartError::InvalidPrice {
            product_id: product_id.clone(),
            price: unit_price,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::DiscountType;
    use chrono::Duration;

    fn widget(quantity: u32) -> CartItem {
        CartItem::new(
            "SKU-001",
            "Widget",
            "https://img.example/widget.png",
            Money::from_cents(1000),
            quantity,
        )
    }

    fn percentage_voucher(percentage: u32) -> Voucher {
        Voucher {
            code: "SUMMER10".to_string(),
            discount_type: DiscountType::Percentage,
            percentage,
            value: Money::zero(),
            expiration_date: Utc::now() + Duration::days(30),
            active: true,
            first_time_use_only: false,
        }
    }

    #[test]
    fn test_create_cart_is_empty() {
        let cart = ShoppingCart::create(CustomerId::new());
        assert_eq!(cart.item_count(), 0);
        assert!(cart.amount().is_zero());
        assert!(cart.discount().is_zero());
        assert!(!cart.has_voucher());
        assert_eq!(cart.version(), Version::initial());
    }

    #[test]
    fn test_add_item() {
        let mut cart = ShoppingCart::create(CustomerId::new());

        let outcome = cart.add_item(widget(2)).unwrap();

        assert_eq!(outcome, AddOutcome::Inserted);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.amount().cents(), 2000);
    }

    #[test]
    fn test_add_same_product_merges_quantities() {
        let mut cart = ShoppingCart::create(CustomerId::new());

        cart.add_item(widget(2)).unwrap();
        let outcome = cart.add_item(widget(3)).unwrap();

        assert_eq!(outcome, AddOutcome::Merged);
        assert_eq!(cart.item_count(), 1);
        let item = cart.item(&ProductId::new("SKU-001")).unwrap();
        assert_eq!(item.quantity, 5);
        assert_eq!(cart.amount().cents(), 5000);
    }

    #[test]
    fn test_merge_keeps_original_item_identity() {
        let mut cart = ShoppingCart::create(CustomerId::new());

        let first = widget(2);
        let first_id = first.id;
        cart.add_item(first).unwrap();
        cart.add_item(widget(3)).unwrap();

        assert_eq!(cart.item(&ProductId::new("SKU-001")).unwrap().id, first_id);
    }

    #[test]
    fn test_add_item_quantity_bounds() {
        let mut cart = ShoppingCart::create(CustomerId::new());

        assert!(matches!(
            cart.add_item(widget(0)),
            Err(CartError::InvalidQuantity { quantity: 0, .. })
        ));
        assert!(matches!(
            cart.add_item(widget(16)),
            Err(CartError::InvalidQuantity { quantity: 16, .. })
        ));
        assert_eq!(cart.item_count(), 0);
        assert!(cart.amount().is_zero());

        assert!(cart.add_item(widget(1)).is_ok());
        let mut cart = ShoppingCart::create(CustomerId::new());
        assert!(cart.add_item(widget(15)).is_ok());
    }

    #[test]
    fn test_add_item_overflowing_line_total_leaves_state_unchanged() {
        let mut cart = ShoppingCart::create(CustomerId::new());

        let item = CartItem::new(
            "SKU-001",
            "Widget",
            "https://img.example/widget.png",
            Money::from_cents(i64::MAX),
            2,
        );
        let result = cart.add_item(item);

        assert!(matches!(result, Err(CartError::InvalidPrice { .. })));
        assert_eq!(cart.item_count(), 0);
        assert!(cart.amount().is_zero());
    }

    #[test]
    fn test_add_item_negative_price_rejected() {
        let mut cart = ShoppingCart::create(CustomerId::new());

        let item = CartItem::new(
            "SKU-001",
            "Widget",
            "https://img.example/widget.png",
            Money::from_cents(-500),
            1,
        );
        let result = cart.add_item(item);

        assert!(matches!(result, Err(CartError::InvalidPrice { .. })));
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_merge_that_overflows_line_total_leaves_state_unchanged() {
        let mut cart = ShoppingCart::create(CustomerId::new());
        let huge = CartItem::new(
            "SKU-001",
            "Widget",
            "https://img.example/widget.png",
            Money::from_cents(i64::MAX / 2),
            1,
        );
        cart.add_item(huge.clone()).unwrap();

        let result = cart.add_item(CartItem { quantity: 2, ..huge });

        assert!(matches!(result, Err(CartError::InvalidPrice { .. })));
        assert_eq!(cart.item(&ProductId::new("SKU-001")).unwrap().quantity, 1);
    }

    #[test]
    fn test_merge_beyond_bound_is_rejected_without_state_change() {
        let mut cart = ShoppingCart::create(CustomerId::new());

        cart.add_item(widget(10)).unwrap();
        let result = cart.add_item(widget(6));

        assert!(matches!(
            result,
            Err(CartError::InvalidQuantity { quantity: 16, .. })
        ));
        assert_eq!(cart.item(&ProductId::new("SKU-001")).unwrap().quantity, 10);
        assert_eq!(cart.amount().cents(), 10000);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = ShoppingCart::create(CustomerId::new());
        cart.add_item(widget(2)).unwrap();

        cart.update_quantity(&ProductId::new("SKU-001"), 5).unwrap();

        assert_eq!(cart.item(&ProductId::new("SKU-001")).unwrap().quantity, 5);
        assert_eq!(cart.amount().cents(), 5000);
    }

    #[test]
    fn test_update_quantity_out_of_bounds_leaves_state_unchanged() {
        let mut cart = ShoppingCart::create(CustomerId::new());
        cart.add_item(widget(2)).unwrap();

        let result = cart.update_quantity(&ProductId::new("SKU-001"), 16);

        assert!(matches!(result, Err(CartError::InvalidQuantity { .. })));
        assert_eq!(cart.item(&ProductId::new("SKU-001")).unwrap().quantity, 2);
        assert_eq!(cart.amount().cents(), 2000);
    }

    #[test]
    fn test_update_quantity_of_missing_item_fails() {
        let mut cart = ShoppingCart::create(CustomerId::new());
        let result = cart.update_quantity(&ProductId::new("SKU-404"), 3);
        assert!(matches!(result, Err(CartError::ItemNotFound { .. })));
    }

    #[test]
    fn test_remove_item() {
        let mut cart = ShoppingCart::create(CustomerId::new());
        cart.add_item(widget(2)).unwrap();

        let removed = cart.remove_item(&ProductId::new("SKU-001")).unwrap();

        assert_eq!(removed.product_id.as_str(), "SKU-001");
        assert_eq!(cart.item_count(), 0);
        assert!(cart.amount().is_zero());
    }

    #[test]
    fn test_remove_missing_item_fails() {
        let mut cart = ShoppingCart::create(CustomerId::new());
        let result = cart.remove_item(&ProductId::new("SKU-404"));
        assert!(matches!(result, Err(CartError::ItemNotFound { .. })));
    }

    #[test]
    fn test_amount_tracks_every_mutation() {
        let mut cart = ShoppingCart::create(CustomerId::new());

        cart.add_item(widget(2)).unwrap();
        cart.add_item(CartItem::new(
            "SKU-002",
            "Gadget",
            "https://img.example/gadget.png",
            Money::from_cents(500),
            3,
        ))
        .unwrap();
        assert_eq!(cart.amount().cents(), 3500);

        cart.update_quantity(&ProductId::new("SKU-002"), 1).unwrap();
        assert_eq!(cart.amount().cents(), 2500);

        cart.remove_item(&ProductId::new("SKU-001")).unwrap();
        assert_eq!(cart.amount().cents(), 500);
    }

    #[test]
    fn test_apply_voucher_computes_discount() {
        let mut cart = ShoppingCart::create(CustomerId::new());
        cart.add_item(widget(2)).unwrap();

        cart.apply_voucher(percentage_voucher(10), Utc::now(), false)
            .unwrap();

        assert!(cart.has_voucher());
        assert_eq!(cart.discount().cents(), 200);
    }

    #[test]
    fn test_discount_follows_amount_changes() {
        let mut cart = ShoppingCart::create(CustomerId::new());
        cart.add_item(widget(2)).unwrap();
        cart.apply_voucher(percentage_voucher(10), Utc::now(), false)
            .unwrap();
        assert_eq!(cart.discount().cents(), 200);

        cart.update_quantity(&ProductId::new("SKU-001"), 4).unwrap();
        assert_eq!(cart.discount().cents(), 400);
    }

    #[test]
    fn test_expired_voucher_leaves_cart_unchanged() {
        let mut cart = ShoppingCart::create(CustomerId::new());
        cart.add_item(widget(2)).unwrap();

        let mut voucher = percentage_voucher(10);
        voucher.expiration_date = Utc::now() - chrono::Duration::days(1);

        let result = cart.apply_voucher(voucher, Utc::now(), false);

        assert!(matches!(result, Err(CartError::VoucherExpired { .. })));
        assert!(!cart.has_voucher());
        assert!(cart.discount().is_zero());
    }

    #[test]
    fn test_validate_empty_cart_passes() {
        let cart = ShoppingCart::create(CustomerId::new());
        assert!(cart.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_all_violations() {
        // Corrupt state straight from storage: two over-quantity items.
        let customer_id = CustomerId::new();
        let cart_id = CartId::new();
        let stored = StoredCart {
            cart: CartRecord {
                cart_id,
                customer_id,
                voucher: None,
            },
            items: vec![
                widget(16).to_record(cart_id),
                CartItem::new(
                    "SKU-002",
                    "Gadget",
                    "https://img.example/gadget.png",
                    Money::from_cents(500),
                    20,
                )
                .to_record(cart_id),
            ],
            version: Version::new(1),
        };

        let cart = ShoppingCart::from_stored(stored).unwrap();
        let violations = cart.validate();
        assert_eq!(violations.len(), 2);
        assert!(
            violations
                .iter()
                .all(|v| matches!(v, CartError::InvalidQuantity { .. }))
        );
    }

    #[test]
    fn test_stored_roundtrip_preserves_cart() {
        let mut cart = ShoppingCart::create(CustomerId::new());
        cart.add_item(widget(2)).unwrap();
        cart.apply_voucher(percentage_voucher(10), Utc::now(), false)
            .unwrap();
        cart.set_version(Version::new(2));

        let stored = StoredCart {
            cart: cart.to_record().unwrap(),
            items: cart
                .items()
                .iter()
                .map(|item| item.to_record(cart.id()))
                .collect(),
            version: cart.version(),
        };

        let rebuilt = ShoppingCart::from_stored(stored).unwrap();
        assert_eq!(rebuilt.id(), cart.id());
        assert_eq!(rebuilt.amount(), cart.amount());
        assert_eq!(rebuilt.discount(), cart.discount());
        assert_eq!(rebuilt.items(), cart.items());
        assert_eq!(rebuilt.version(), Version::new(2));
    }
}
