//! Coupons
//!
//! The coupon ledger and the eligibility pre-check that guards applying a
//! coupon to a cart. Selection bookkeeping (at most one applied coupon,
//! weak by code) belongs to the session, not the ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::Cart,
    pricing::{self, PricingError},
};

/// Minimum no-coupon cart total for percentage coupons, in minor units.
pub const PERCENTAGE_COUPON_MINIMUM: u64 = 10_000;

/// How a coupon discounts the cart total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Subtract a fixed amount of minor units.
    Amount,

    /// Scale the total down by a percentage.
    Percentage,
}

/// A cart-level discount, applied after per-item discounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Display name.
    pub name: String,

    /// Unique ledger key; matched case-sensitively.
    pub code: String,

    /// Amount or percentage.
    pub discount_type: DiscountType,

    /// Minor units for amount coupons, percent figure for percentage ones.
    pub discount_value: Decimal,
}

/// Errors raised by the coupon ledger and eligibility checks.
#[derive(Debug, Error, PartialEq)]
pub enum CouponError {
    /// A coupon with the same code is already in the ledger.
    #[error("a coupon with code {code} already exists")]
    DuplicateCode {
        /// The conflicting code.
        code: String,
    },

    /// No coupon with the given code exists.
    #[error("no coupon with code {code} exists")]
    NotFound {
        /// The missing code.
        code: String,
    },

    /// The cart total is below the percentage-coupon minimum.
    #[error("percentage coupons require a purchase of at least {minimum}")]
    MinimumNotMet {
        /// The minimum purchase, in minor units.
        minimum: u64,
    },

    /// Wrapped totals computation error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Coupon ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponBook {
    coupons: Vec<Coupon>,
}

impl CouponBook {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger with the given coupons.
    pub fn with_coupons(coupons: impl Into<Vec<Coupon>>) -> Self {
        CouponBook {
            coupons: coupons.into(),
        }
    }

    /// Iterate over the coupons in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.iter()
    }

    /// Number of coupons in the ledger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Check if the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    /// Find a coupon by code.
    pub fn find(&self, code: &str) -> Option<&Coupon> {
        self.coupons.iter().find(|coupon| coupon.code == code)
    }

    /// Check whether a code is present.
    pub fn contains(&self, code: &str) -> bool {
        self.find(code).is_some()
    }

    /// Append a coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::DuplicateCode`] when the code is already
    /// present (case-sensitive exact match).
    pub fn add(&self, coupon: Coupon) -> Result<Self, CouponError> {
        if self.contains(&coupon.code) {
            return Err(CouponError::DuplicateCode { code: coupon.code });
        }

        let mut coupons = self.coupons.clone();
        coupons.push(coupon);

        Ok(CouponBook { coupons })
    }

    /// Remove a coupon by code.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::NotFound`] when the code is absent.
    pub fn remove(&self, code: &str) -> Result<Self, CouponError> {
        if !self.contains(code) {
            return Err(CouponError::NotFound {
                code: code.to_string(),
            });
        }

        Ok(CouponBook {
            coupons: self
                .coupons
                .iter()
                .filter(|coupon| coupon.code != code)
                .cloned()
                .collect(),
        })
    }
}

/// Eligibility pre-check for applying `coupon` to `cart`.
///
/// Percentage coupons require the item-level-discounted total (with no
/// coupon applied) to reach [`PERCENTAGE_COUPON_MINIMUM`]; amount coupons
/// have no minimum-purchase gate. This does not itself apply the coupon.
///
/// # Errors
///
/// Returns [`CouponError::MinimumNotMet`] when the gate fails, or a
/// wrapped [`PricingError`] if totals cannot be computed.
pub fn validate_application(coupon: &Coupon, cart: &Cart) -> Result<(), CouponError> {
    let totals = pricing::cart_totals(cart, None)?;

    if totals.total_after_discount < PERCENTAGE_COUPON_MINIMUM
        && coupon.discount_type == DiscountType::Percentage
    {
        return Err(CouponError::MinimumNotMet {
            minimum: PERCENTAGE_COUPON_MINIMUM,
        });
    }

    Ok(())
}
