//! Pricing
//!
//! Monetary totals derived from a cart and an optional coupon. Everything
//! here is recomputed on demand; totals have no lifecycle of their own.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    coupons::{Coupon, DiscountType},
    discounts::{DiscountError, discounted_total, effective_discount_rate},
};

/// Derived cart totals, in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of `price * quantity` over all lines, before any discount.
    pub total_before_discount: u64,

    /// Total payable after item discounts and the coupon, if any.
    pub total_after_discount: u64,

    /// Difference between the two, floored at zero.
    pub total_discount: u64,
}

/// Errors that can occur while computing totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Wrapped rate arithmetic error.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Coupon arithmetic left the representable range.
    #[error("coupon value conversion overflowed")]
    CouponConversion,
}

/// Total for one line after its effective discount rate.
///
/// The rate is applied to the full `price * quantity` product and rounded
/// once, half away from zero.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the effective rate cannot be applied.
pub fn line_total(line: &CartLine, cart: &Cart) -> Result<u64, DiscountError> {
    let rate = effective_discount_rate(line, cart);

    discounted_total(line.product.price * u64::from(line.quantity), rate)
}

/// Sum of `price * quantity` over all lines.
///
/// Prices are integral minor units, so the sum is exact and needs no
/// rounding step.
pub fn total_before_discount(cart: &Cart) -> u64 {
    cart.iter()
        .map(|line| line.product.price * u64::from(line.quantity))
        .sum()
}

/// Sum of per-line discounted totals, before any coupon.
///
/// # Errors
///
/// Returns a [`DiscountError`] if any line's rate cannot be applied.
pub fn item_discounted_total(cart: &Cart) -> Result<u64, DiscountError> {
    cart.iter()
        .try_fold(0u64, |sum, line| Ok(sum + line_total(line, cart)?))
}

/// Applies a coupon to an already item-discounted total.
///
/// Amount coupons subtract their value; percentage coupons scale the
/// total. Both branches floor at zero, so a coupon can never produce a
/// negative total.
///
/// # Errors
///
/// Returns [`PricingError::CouponConversion`] if the coupon value pushes
/// the arithmetic outside the representable range.
pub fn apply_coupon_discount(total: u64, coupon: Option<&Coupon>) -> Result<u64, PricingError> {
    let Some(coupon) = coupon else {
        return Ok(total);
    };

    let total = Decimal::from(total);
    let discounted = match coupon.discount_type {
        DiscountType::Amount => total
            .checked_sub(coupon.discount_value)
            .ok_or(PricingError::CouponConversion)?,
        DiscountType::Percentage => {
            let keep = Decimal::ONE
                .checked_sub(
                    coupon
                        .discount_value
                        .checked_div(Decimal::ONE_HUNDRED)
                        .ok_or(PricingError::CouponConversion)?,
                )
                .ok_or(PricingError::CouponConversion)?;

            total
                .checked_mul(keep)
                .ok_or(PricingError::CouponConversion)?
        }
    };

    let rounded = discounted
        .max(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_u64().ok_or(PricingError::CouponConversion)
}

/// Authoritative totals for a cart and an optional coupon.
///
/// # Errors
///
/// Returns a [`PricingError`] if rate or coupon arithmetic fails.
pub fn cart_totals(cart: &Cart, coupon: Option<&Coupon>) -> Result<Totals, PricingError> {
    let total_before_discount = total_before_discount(cart);
    let discounted_items = item_discounted_total(cart)?;
    let total_after_discount = apply_coupon_discount(discounted_items, coupon)?;

    Ok(Totals {
        total_before_discount,
        total_after_discount,
        total_discount: total_before_discount.saturating_sub(total_after_discount),
    })
}
