//! Store
//!
//! The persistence boundary: a plain textual key-value store keyed by
//! name, with last-write-wins semantics. The engine never holds a lock on
//! it; callers save and load whole snapshots.

use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Storage key for the catalog document.
pub const PRODUCTS_KEY: &str = "products";

/// Storage key for the coupon ledger document.
pub const COUPONS_KEY: &str = "coupons";

/// Storage key for the cart document.
pub const CART_KEY: &str = "cart";

/// Errors raised at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stored document could not be encoded or decoded.
    #[error("failed to encode or decode a stored document: {0}")]
    Document(#[from] serde_json::Error),
}

/// Plain get/set textual storage keyed by name.
pub trait DocumentStore {
    /// Fetch the document stored under `name`, if any.
    fn get(&self, name: &str) -> Option<String>;

    /// Store `document` under `name`, replacing any previous value.
    fn put(&mut self, name: &str, document: String);
}

/// In-memory store for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: FxHashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, name: &str) -> Option<String> {
        self.documents.get(name).cloned()
    }

    fn put(&mut self, name: &str, document: String) {
        self.documents.insert(name.to_string(), document);
    }
}

/// Serialize `value` and store it under `name`.
///
/// # Errors
///
/// Returns a [`StoreError`] if the value cannot be serialized.
pub fn save<S, T>(store: &mut S, name: &str, value: &T) -> Result<(), StoreError>
where
    S: DocumentStore + ?Sized,
    T: Serialize,
{
    let document = serde_json::to_string(value)?;
    store.put(name, document);

    Ok(())
}

/// Load and decode the document stored under `name`.
///
/// A missing document is `None`, not an error.
///
/// # Errors
///
/// Returns a [`StoreError`] if a present document cannot be decoded.
pub fn load<S, T>(store: &S, name: &str) -> Result<Option<T>, StoreError>
where
    S: DocumentStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(name) {
        Some(document) => Ok(Some(serde_json::from_str(&document)?)),
        None => Ok(None),
    }
}
