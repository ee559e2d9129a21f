//! Products

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Per-product tier list; nearly always a handful of entries.
pub type DiscountTiers = SmallVec<[DiscountTier; 4]>;

/// A quantity threshold paired with a discount rate.
///
/// A tier qualifies once the line quantity is at or above its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountTier {
    /// Minimum line quantity for the tier to qualify.
    pub quantity: u32,

    /// Discount rate in `(0, 1]`.
    pub rate: f64,
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable unique identifier, assigned by the catalog.
    pub id: String,

    /// Display name; never empty or whitespace-only.
    pub name: String,

    /// Optional longer description, searchable alongside the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unit price in minor currency units.
    pub price: u64,

    /// Units available for sale.
    pub stock: u32,

    /// Quantity discount tiers; thresholds are unique within one product.
    #[serde(default)]
    pub discounts: DiscountTiers,
}

/// Caller-supplied fields for a new product.
///
/// Price and stock are signed on purpose: the caller passes unvalidated
/// input, and the catalog rejects negatives before converting into the
/// unsigned domain representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Display name.
    pub name: String,

    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unit price in minor currency units; must be zero or greater.
    pub price: i64,

    /// Units available for sale; must be zero or greater.
    pub stock: i64,

    /// Initial discount tiers.
    #[serde(default)]
    pub discounts: DiscountTiers,
}

/// Partial update for an existing product.
///
/// Only the fields that are present are re-validated and applied; the rest
/// of the record is left untouched (shallow merge).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    /// Replacement display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Replacement description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Replacement unit price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,

    /// Replacement stock level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,

    /// Replacement tier list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounts: Option<DiscountTiers>,
}
