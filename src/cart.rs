//! Cart
//!
//! Ordered cart lines, unique by product id, mutated only through the
//! validated operations below. Every operation takes the current snapshot
//! and returns a new one; failure leaves the input untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::products::Product;

/// Errors raised by cart mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// No remaining stock for the product.
    #[error("the product is out of stock")]
    OutOfStock,

    /// The requested quantity is above the product's stock.
    #[error("only {stock} units are in stock")]
    StockExceeded {
        /// Stock limit recorded on the line's product snapshot.
        stock: u32,
    },

    /// The cart has no line for the product.
    #[error("the product is not in the cart")]
    LineNotFound,
}

/// A product snapshot with the quantity being purchased.
///
/// The product is an owned copy taken at add time, so later catalog edits
/// do not retroactively change a cart's totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product snapshot.
    pub product: Product,

    /// Units of the product; always at least 1.
    pub quantity: u32,
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart with the given lines.
    pub fn with_lines(lines: impl Into<Vec<CartLine>>) -> Self {
        Cart {
            lines: lines.into(),
        }
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find the line for a product id, if present.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product_id)
    }

    /// Quantity of a product currently in the cart; 0 when absent.
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.line(product_id).map_or(0, |line| line.quantity)
    }

    /// Total number of units across all lines.
    pub fn total_item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Stock left for `product` after what this cart already holds.
    ///
    /// May be negative transiently (for example right before a mutation is
    /// rejected); a negative value is never authoritative.
    pub fn remaining_stock(&self, product: &Product) -> i64 {
        i64::from(product.stock) - i64::from(self.quantity_of(&product.id))
    }

    /// Add one unit of `product`, appending a new line when needed.
    ///
    /// An existing line is incremented by exactly 1; a new line starts at
    /// quantity 1 and goes to the end of the sequence.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`] when no stock remains for the product.
    /// - [`CartError::StockExceeded`] when the increment would pass the
    ///   product's stock.
    pub fn add_item(&self, product: &Product) -> Result<Self, CartError> {
        if self.remaining_stock(product) <= 0 {
            return Err(CartError::OutOfStock);
        }

        if let Some(existing) = self.line(&product.id) {
            let quantity = existing.quantity + 1;
            if quantity > product.stock {
                return Err(CartError::StockExceeded {
                    stock: product.stock,
                });
            }

            return Ok(self.with_quantity(&product.id, quantity));
        }

        let mut lines = self.lines.clone();
        lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
        });

        Ok(Cart { lines })
    }

    /// Remove the line for a product id.
    ///
    /// Total and idempotent; an absent id is a no-op, not an error.
    #[must_use]
    pub fn remove_item(&self, product_id: &str) -> Self {
        Cart {
            lines: self
                .lines
                .iter()
                .filter(|line| line.product.id != product_id)
                .cloned()
                .collect(),
        }
    }

    /// Set a line's quantity to an absolute value.
    ///
    /// A non-positive quantity is a delete intent and delegates to
    /// [`Cart::remove_item`]. The stock bound is the line's product
    /// snapshot, not the live catalog.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`] when the product has no line.
    /// - [`CartError::StockExceeded`] when the quantity is above the
    ///   snapshot stock.
    pub fn update_quantity(&self, product_id: &str, new_quantity: i64) -> Result<Self, CartError> {
        if new_quantity <= 0 {
            return Ok(self.remove_item(product_id));
        }

        let line = self.line(product_id).ok_or(CartError::LineNotFound)?;
        let stock = line.product.stock;

        if new_quantity > i64::from(stock) {
            return Err(CartError::StockExceeded { stock });
        }

        // Bounded by the stock check above.
        let quantity = u32::try_from(new_quantity).unwrap_or(stock);

        Ok(self.with_quantity(product_id, quantity))
    }

    fn with_quantity(&self, product_id: &str, quantity: u32) -> Self {
        let lines = self
            .lines
            .iter()
            .cloned()
            .map(|mut line| {
                if line.product.id == product_id {
                    line.quantity = quantity;
                }
                line
            })
            .collect();

        Cart { lines }
    }
}
