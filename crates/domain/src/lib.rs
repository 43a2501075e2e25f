//! Domain layer for the shopping cart service.
//!
//! This crate provides the core cart model:
//! - ShoppingCart aggregate with item and voucher mutations
//! - VoucherPolicy deciding eligibility and discount amounts
//! - CartService orchestrating one mutation per request
//! - ErrorAccumulator collecting violations before persistence

pub mod accumulator;
pub mod cart;
pub mod error;

pub use accumulator::ErrorAccumulator;
pub use cart::{
    AddItemToCart, AddOutcome, ApplyVoucherToCart, CartError, CartItem, CartService, DiscountType,
    Money, RemoveCartItem, ShoppingCart, UpdateCartItem, Voucher, VoucherPolicy,
    MAX_ITEM_QUANTITY, MIN_ITEM_QUANTITY,
};
pub use common::{CartId, CustomerId, ItemId, ProductId};
pub use error::DomainError;
