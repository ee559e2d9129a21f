//! Catalog
//!
//! Product CRUD, including the nested discount-tier rules. Independent of
//! any cart state: removing or editing a product never reaches into carts
//! that hold a snapshot of it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::products::{DiscountTier, Product, ProductDraft, ProductPatch};

/// Errors raised by catalog mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// No product with the given id exists.
    #[error("no product with id {id} exists")]
    NotFound {
        /// The missing id.
        id: String,
    },

    /// The product name is empty or whitespace-only.
    #[error("a product name must not be empty")]
    InvalidName,

    /// The price is negative.
    #[error("a product price must be zero or greater")]
    InvalidPrice,

    /// The stock is negative.
    #[error("a product stock must be zero or greater")]
    InvalidStock,

    /// The tier threshold is below 1.
    #[error("a discount tier quantity must be at least 1")]
    InvalidTierQuantity,

    /// The tier rate is outside `(0, 1]`.
    #[error("a discount tier rate must be above 0 and at most 1")]
    InvalidTierRate,

    /// A tier with the same threshold already exists on the product.
    #[error("a discount tier for quantity {quantity} already exists")]
    DuplicateTierQuantity {
        /// The conflicting threshold.
        quantity: u32,
    },

    /// No tier exists at the given position.
    #[error("no discount tier exists at index {index}")]
    IndexOutOfRange {
        /// The out-of-range position.
        index: usize,
    },
}

/// Catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with the given products.
    pub fn with_products(products: impl Into<Vec<Product>>) -> Self {
        Catalog {
            products: products.into(),
        }
    }

    /// Iterate over the products in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Find a product by id.
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Check whether an id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Products whose name or description contains `term`.
    ///
    /// Case-insensitive; a blank term returns everything.
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let term = term.trim().to_lowercase();

        if term.is_empty() {
            return self.products.iter().collect();
        }

        self.products
            .iter()
            .filter(|product| {
                product.name.to_lowercase().contains(&term)
                    || product
                        .description
                        .as_ref()
                        .is_some_and(|description| description.to_lowercase().contains(&term))
            })
            .collect()
    }

    /// Validate a draft and append it with a fresh unique id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidName`], [`CatalogError::InvalidPrice`]
    /// or [`CatalogError::InvalidStock`] when a field fails validation.
    pub fn add(&self, draft: ProductDraft) -> Result<Self, CatalogError> {
        validate_name(&draft.name)?;
        let price = validate_price(draft.price)?;
        let stock = validate_stock(draft.stock)?;

        let product = Product {
            id: self.fresh_id(),
            name: draft.name,
            description: draft.description,
            price,
            stock,
            discounts: draft.discounts,
        };

        let mut products = self.products.clone();
        products.push(product);

        Ok(Catalog { products })
    }

    /// Shallow-merge a patch onto an existing product.
    ///
    /// Only the fields present in the patch are re-validated, with the same
    /// rules as [`Catalog::add`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the id is absent, or a
    /// validation error for a present-but-invalid field.
    pub fn update(&self, id: &str, patch: ProductPatch) -> Result<Self, CatalogError> {
        if !self.contains(id) {
            return Err(CatalogError::NotFound { id: id.to_string() });
        }

        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        let price = patch.price.map(validate_price).transpose()?;
        let stock = patch.stock.map(validate_stock).transpose()?;

        let products = self
            .products
            .iter()
            .cloned()
            .map(|mut product| {
                if product.id == id {
                    if let Some(name) = patch.name.clone() {
                        product.name = name;
                    }
                    if let Some(description) = patch.description.clone() {
                        product.description = Some(description);
                    }
                    if let Some(price) = price {
                        product.price = price;
                    }
                    if let Some(stock) = stock {
                        product.stock = stock;
                    }
                    if let Some(discounts) = patch.discounts.clone() {
                        product.discounts = discounts;
                    }
                }
                product
            })
            .collect();

        Ok(Catalog { products })
    }

    /// Remove a product by id.
    ///
    /// Carts holding a snapshot of the product are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the id is absent.
    pub fn remove(&self, id: &str) -> Result<Self, CatalogError> {
        if !self.contains(id) {
            return Err(CatalogError::NotFound { id: id.to_string() });
        }

        Ok(Catalog {
            products: self
                .products
                .iter()
                .filter(|product| product.id != id)
                .cloned()
                .collect(),
        })
    }

    /// Replace a product's stock level.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidStock`] for a negative level, or
    /// [`CatalogError::NotFound`] when the id is absent.
    pub fn update_stock(&self, id: &str, new_stock: i64) -> Result<Self, CatalogError> {
        if new_stock < 0 {
            return Err(CatalogError::InvalidStock);
        }

        self.update(
            id,
            ProductPatch {
                stock: Some(new_stock),
                ..ProductPatch::default()
            },
        )
    }

    /// Add a discount tier to a product, keeping tiers sorted ascending by
    /// threshold.
    ///
    /// The sort order is a presentation convenience; rate selection is
    /// order-independent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`], [`CatalogError::InvalidTierQuantity`],
    /// [`CatalogError::InvalidTierRate`] or
    /// [`CatalogError::DuplicateTierQuantity`].
    pub fn add_discount_tier(&self, id: &str, tier: DiscountTier) -> Result<Self, CatalogError> {
        let product = self
            .find(id)
            .ok_or_else(|| CatalogError::NotFound { id: id.to_string() })?;

        if tier.quantity == 0 {
            return Err(CatalogError::InvalidTierQuantity);
        }
        if !tier.rate.is_finite() || tier.rate <= 0.0 || tier.rate > 1.0 {
            return Err(CatalogError::InvalidTierRate);
        }
        if product
            .discounts
            .iter()
            .any(|existing| existing.quantity == tier.quantity)
        {
            return Err(CatalogError::DuplicateTierQuantity {
                quantity: tier.quantity,
            });
        }

        let mut discounts = product.discounts.clone();
        discounts.push(tier);
        discounts.sort_unstable_by_key(|tier| tier.quantity);

        self.update(
            id,
            ProductPatch {
                discounts: Some(discounts),
                ..ProductPatch::default()
            },
        )
    }

    /// Remove the discount tier at a position.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] or
    /// [`CatalogError::IndexOutOfRange`].
    pub fn remove_discount_tier(&self, id: &str, index: usize) -> Result<Self, CatalogError> {
        let product = self
            .find(id)
            .ok_or_else(|| CatalogError::NotFound { id: id.to_string() })?;

        if index >= product.discounts.len() {
            return Err(CatalogError::IndexOutOfRange { index });
        }

        let discounts = product
            .discounts
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != index)
            .map(|(_, tier)| *tier)
            .collect();

        self.update(
            id,
            ProductPatch {
                discounts: Some(discounts),
                ..ProductPatch::default()
            },
        )
    }

    /// Next free id of the form `p<n>`.
    ///
    /// Derived from the catalog content rather than a clock, so ids are
    /// deterministic and unique within a catalog.
    fn fresh_id(&self) -> String {
        let next = self
            .products
            .iter()
            .filter_map(|product| product.id.strip_prefix('p'))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .map_or(1, |highest| highest + 1);

        format!("p{next}")
    }
}

fn validate_name(name: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::InvalidName);
    }

    Ok(())
}

fn validate_price(price: i64) -> Result<u64, CatalogError> {
    u64::try_from(price).ok().ok_or(CatalogError::InvalidPrice)
}

fn validate_stock(stock: i64) -> Result<u32, CatalogError> {
    u32::try_from(stock).ok().ok_or(CatalogError::InvalidStock)
}
