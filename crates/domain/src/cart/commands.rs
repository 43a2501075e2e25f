//! Cart mutation commands.
//!
//! Each inbound request binds to exactly one of these; the command
//! carries the resolved customer identity alongside the payload.

use common::{CustomerId, ProductId};

use super::{CartItem, Money, Voucher};

/// Command to add an item to a customer's cart.
///
/// Creates the cart in memory if the customer doesn't have one yet.
#[derive(Debug, Clone)]
pub struct AddItemToCart {
    /// The customer whose cart is mutated.
    pub customer_id: CustomerId,

    /// The item to add (catalog snapshot included).
    pub item: CartItem,
}

impl AddItemToCart {
    /// Creates a new AddItemToCart command.
    pub fn new(customer_id: CustomerId, item: CartItem) -> Self {
        Self { customer_id, item }
    }

    /// Creates a new AddItemToCart command from individual fields.
    pub fn with_details(
        customer_id: CustomerId,
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        image: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            customer_id,
            item: CartItem::new(product_id, name, image, unit_price, quantity),
        }
    }
}

/// Command to replace the quantity of an item in a customer's cart.
///
/// Carries both the path product ID (`target`) and the one from the
/// request body; the orchestrator rejects the request when they
/// disagree, before any mutation.
#[derive(Debug, Clone)]
pub struct UpdateCartItem {
    /// The customer whose cart is mutated.
    pub customer_id: CustomerId,

    /// The product named in the request path.
    pub target: ProductId,

    /// The product named in the request body.
    pub product_id: ProductId,

    /// The replacement quantity.
    pub new_quantity: u32,
}

impl UpdateCartItem {
    /// Creates a new UpdateCartItem command.
    pub fn new(
        customer_id: CustomerId,
        target: impl Into<ProductId>,
        product_id: impl Into<ProductId>,
        new_quantity: u32,
    ) -> Self {
        Self {
            customer_id,
            target: target.into(),
            product_id: product_id.into(),
            new_quantity,
        }
    }
}

/// Command to remove an item from a customer's cart.
#[derive(Debug, Clone)]
pub struct RemoveCartItem {
    /// The customer whose cart is mutated.
    pub customer_id: CustomerId,

    /// The product to remove.
    pub product_id: ProductId,
}

impl RemoveCartItem {
    /// Creates a new RemoveCartItem command.
    pub fn new(customer_id: CustomerId, product_id: impl Into<ProductId>) -> Self {
        Self {
            customer_id,
            product_id: product_id.into(),
        }
    }
}

/// Command to apply a discount voucher to a customer's cart.
#[derive(Debug, Clone)]
pub struct ApplyVoucherToCart {
    /// The customer whose cart is mutated.
    pub customer_id: CustomerId,

    /// The voucher to apply (value-copy from the voucher service).
    pub voucher: Voucher,

    /// Whether a first-time-use voucher has already been consumed by
    /// this customer, as reported by the voucher service.
    pub first_use_consumed: bool,
}

impl ApplyVoucherToCart {
    /// Creates a new ApplyVoucherToCart command for a first use.
    pub fn new(customer_id: CustomerId, voucher: Voucher) -> Self {
        Self {
            customer_id,
            voucher,
            first_use_consumed: false,
        }
    }

    /// Sets whether the voucher's first use has already been consumed.
    pub fn with_first_use_consumed(mut self, consumed: bool) -> Self {
        self.first_use_consumed = consumed;
        self
    }
}
