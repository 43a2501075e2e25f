//! Voucher value object and discount policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CartError, Money};

/// How a voucher discounts the cart amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountType {
    /// Discount is a percentage of the cart amount.
    Percentage,
    /// Discount is a fixed money value, capped at the cart amount.
    FixedValue,
}

/// A discount voucher applied to a cart.
///
/// The cart stores a value-copy sufficient to recompute the discount,
/// not a live reference to the voucher catalog. Whether a first-time-use
/// voucher has already been consumed is tracked by an external
/// collaborator and passed in at application time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    /// Voucher code.
    pub code: String,

    /// Discount kind; decides which of `percentage`/`value` applies.
    pub discount_type: DiscountType,

    /// Percentage discount, used iff `discount_type` is `Percentage`.
    #[serde(default)]
    pub percentage: u32,

    /// Fixed discount, used iff `discount_type` is `FixedValue`.
    #[serde(default)]
    pub value: Money,

    /// Moment after which the voucher is no longer applicable.
    pub expiration_date: DateTime<Utc>,

    /// Whether the voucher is currently active.
    pub active: bool,

    /// Whether the voucher may only be used on a customer's first order.
    #[serde(default)]
    pub first_time_use_only: bool,
}

/// Pure discount-calculation logic for vouchers.
pub struct VoucherPolicy;

impl VoucherPolicy {
    /// Checks whether a voucher may be applied at all.
    ///
    /// A voucher must be active, unexpired, and, when limited to
    /// first-time use, not already consumed by this customer.
    pub fn ensure_eligible(
        voucher: &Voucher,
        now: DateTime<Utc>,
        first_use_consumed: bool,
    ) -> Result<(), CartError> {
        if !voucher.active {
            return Err(CartError::VoucherInactive {
                code: voucher.code.clone(),
            });
        }

        if voucher.expiration_date < now {
            return Err(CartError::VoucherExpired {
                code: voucher.code.clone(),
                expired_at: voucher.expiration_date,
            });
        }

        if voucher.first_time_use_only && first_use_consumed {
            return Err(CartError::FirstUseAlreadyConsumed {
                code: voucher.code.clone(),
            });
        }

        Ok(())
    }

    /// Computes the discount a voucher yields on the given amount.
    ///
    /// A fixed-value discount is capped at the pre-discount amount, so
    /// the post-discount total can never go negative.
    pub fn compute_discount(amount: Money, voucher: &Voucher) -> Money {
        match voucher.discount_type {
            DiscountType::Percentage => amount.percent(voucher.percentage),
            DiscountType::FixedValue => voucher.value.min(amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn percentage_voucher(percentage: u32) -> Voucher {
        Voucher {
            code: "PCT".to_string(),
            discount_type: DiscountType::Percentage,
            percentage,
            value: Money::zero(),
            expiration_date: Utc::now() + Duration::days(30),
            active: true,
            first_time_use_only: false,
        }
    }

    fn fixed_voucher(cents: i64) -> Voucher {
        Voucher {
            code: "FIX".to_string(),
            discount_type: DiscountType::FixedValue,
            percentage: 0,
            value: Money::from_cents(cents),
            expiration_date: Utc::now() + Duration::days(30),
            active: true,
            first_time_use_only: false,
        }
    }

    #[test]
    fn percentage_discount_is_fraction_of_amount() {
        let discount = VoucherPolicy::compute_discount(Money::from_cents(20000), &percentage_voucher(10));
        assert_eq!(discount.cents(), 2000);
    }

    #[test]
    fn fixed_discount_is_capped_at_cart_amount() {
        let discount = VoucherPolicy::compute_discount(Money::from_cents(5000), &fixed_voucher(100_000));
        assert_eq!(discount.cents(), 5000);
    }

    #[test]
    fn fixed_discount_below_amount_applies_in_full() {
        let discount = VoucherPolicy::compute_discount(Money::from_cents(5000), &fixed_voucher(1500));
        assert_eq!(discount.cents(), 1500);
    }

    #[test]
    fn inactive_voucher_is_not_eligible() {
        let mut voucher = percentage_voucher(10);
        voucher.active = false;

        let result = VoucherPolicy::ensure_eligible(&voucher, Utc::now(), false);
        assert!(matches!(result, Err(CartError::VoucherInactive { .. })));
    }

    #[test]
    fn expired_voucher_is_not_eligible() {
        let mut voucher = percentage_voucher(10);
        voucher.expiration_date = Utc::now() - Duration::days(1);

        let result = VoucherPolicy::ensure_eligible(&voucher, Utc::now(), false);
        assert!(matches!(result, Err(CartError::VoucherExpired { .. })));
    }

    #[test]
    fn consumed_first_use_voucher_is_not_eligible() {
        let mut voucher = percentage_voucher(10);
        voucher.first_time_use_only = true;

        assert!(VoucherPolicy::ensure_eligible(&voucher, Utc::now(), false).is_ok());

        let result = VoucherPolicy::ensure_eligible(&voucher, Utc::now(), true);
        assert!(matches!(
            result,
            Err(CartError::FirstUseAlreadyConsumed { .. })
        ));
    }

    #[test]
    fn voucher_serialization_roundtrip() {
        let voucher = fixed_voucher(2500);
        let json = serde_json::to_value(&voucher).unwrap();
        let deserialized: Voucher = serde_json::from_value(json).unwrap();
        assert_eq!(voucher, deserialized);
    }
}
