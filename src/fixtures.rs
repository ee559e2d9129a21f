//! Fixtures
//!
//! The embedded seed document a fresh install starts from.

use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::Catalog,
    coupons::{Coupon, CouponBook},
    products::Product,
};

const SEED: &str = include_str!("fixtures/seed.yaml");

/// Fixture parsing errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// YAML parsing error.
    #[error("failed to parse seed fixture: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Seed document layout.
#[derive(Debug, Deserialize)]
struct SeedFixture {
    products: Vec<Product>,
    coupons: Vec<Coupon>,
}

fn seed() -> Result<SeedFixture, FixtureError> {
    Ok(serde_norway::from_str(SEED)?)
}

/// Catalog a fresh install starts with.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the embedded seed does not parse.
pub fn seed_catalog() -> Result<Catalog, FixtureError> {
    Ok(Catalog::with_products(seed()?.products))
}

/// Coupon ledger a fresh install starts with.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the embedded seed does not parse.
pub fn seed_coupons() -> Result<CouponBook, FixtureError> {
    Ok(CouponBook::with_coupons(seed()?.coupons))
}
