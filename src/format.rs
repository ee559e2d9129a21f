//! Formatting
//!
//! Simple display formatting for prices and rates. Nothing here feeds
//! back into computation.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};

/// Format a minor-unit amount in the given currency, e.g. `₩3,000`.
pub fn price(amount: u64, currency: &'static Currency) -> String {
    let minor = i64::try_from(amount).unwrap_or(i64::MAX);

    Money::from_minor(minor, currency).to_string()
}

/// Format a rate as a rounded percentage, e.g. `0.1` becomes `10%`.
pub fn rate(value: f64) -> String {
    let percent = Decimal::from_f64_retain(value)
        .and_then(|rate| rate.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ZERO, |percent| {
            percent.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        });

    format!("{percent}%")
}
