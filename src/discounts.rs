//! Discounts
//!
//! Pure rate computation for cart lines: tiered quantity discounts, the
//! cart-wide bulk bonus, and the conversion of a rate into discounted
//! minor-unit amounts.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    products::DiscountTier,
};

/// Line quantity at which the whole cart qualifies for the bulk bonus.
pub const BULK_PURCHASE_THRESHOLD: u32 = 10;

/// Flat bonus rate added to every line once any line qualifies.
pub const BULK_PURCHASE_BONUS: f64 = 0.05;

/// Absolute ceiling for the effective per-line rate, applied after the
/// bonus addition.
pub const MAX_DISCOUNT_RATE: f64 = 0.5;

/// Errors specific to discount arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// A rate could not be represented for minor-unit arithmetic.
    #[error("discount rate conversion overflowed or was not finite")]
    RateConversion,
}

/// Returns the maximum tier rate satisfied by `quantity`.
///
/// The strictly greatest rate among qualifying tiers wins regardless of
/// threshold size or list order; an empty or unsatisfied tier list yields 0.
pub fn quantity_discount_rate(tiers: &[DiscountTier], quantity: u32) -> f64 {
    tiers.iter().fold(0.0, |best, tier| {
        if quantity >= tier.quantity && tier.rate > best {
            tier.rate
        } else {
            best
        }
    })
}

/// Whether any line in the cart reaches the bulk purchase threshold.
///
/// This is a cart-wide condition, not a per-line one.
pub fn has_bulk_purchase(cart: &Cart) -> bool {
    cart.iter()
        .any(|line| line.quantity >= BULK_PURCHASE_THRESHOLD)
}

/// The rate actually applied to a line, given the cart it sits in.
///
/// Tier rate plus the bulk bonus (if any line in the cart qualifies),
/// capped at [`MAX_DISCOUNT_RATE`].
pub fn effective_discount_rate(line: &CartLine, cart: &Cart) -> f64 {
    let base = quantity_discount_rate(&line.product.discounts, line.quantity);
    let bonus = if has_bulk_purchase(cart) {
        BULK_PURCHASE_BONUS
    } else {
        0.0
    };

    (base + bonus).min(MAX_DISCOUNT_RATE)
}

/// Applies `rate` to an amount of minor units.
///
/// Rounds half away from zero, once on the final product rather than
/// per unit.
///
/// # Errors
///
/// Returns [`DiscountError::RateConversion`] if the rate is not finite or
/// the multiplication cannot be represented.
pub fn discounted_total(amount: u64, rate: f64) -> Result<u64, DiscountError> {
    let Some(rate) = Decimal::from_f64_retain(rate) else {
        return Err(DiscountError::RateConversion);
    };

    let Some(kept) = Decimal::ONE
        .checked_sub(rate)
        .and_then(|keep| keep.checked_mul(Decimal::from(amount)))
    else {
        return Err(DiscountError::RateConversion);
    };

    let rounded = kept.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_u64().ok_or(DiscountError::RateConversion)
}
