//! Session
//!
//! The orchestrating layer between UI intents and the pure engine. Each
//! intent validates against the current snapshots, swaps them
//! all-or-nothing on success, persists the affected document, and turns
//! failures into notifications while leaving prior state untouched.

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::Cart,
    catalog::{Catalog, CatalogError},
    coupons::{self, Coupon, CouponBook, CouponError},
    fixtures::{self, FixtureError},
    notifications::{NotificationQueue, Severity},
    orders::{OrderId, OrderSequence},
    pricing::{self, PricingError, Totals},
    products::{DiscountTier, Product, ProductDraft, ProductPatch},
    store::{self, CART_KEY, COUPONS_KEY, DocumentStore, PRODUCTS_KEY, StoreError},
};

/// Errors raised while opening or persisting a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Wrapped persistence error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Wrapped seed fixture error.
    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

/// A single-user shopping session over a document store.
///
/// Holds the current snapshots, the selected coupon (weak, by code), the
/// notification queue and the order sequence. The store is only ever
/// touched through whole-document saves and loads.
#[derive(Debug)]
pub struct Session<S> {
    catalog: Catalog,
    coupons: CouponBook,
    cart: Cart,
    selected_coupon: Option<String>,
    notifications: NotificationQueue,
    orders: OrderSequence,
    store: S,
}

impl<S: DocumentStore> Session<S> {
    /// Open a session, loading persisted snapshots from `store`.
    ///
    /// Catalog and coupons fall back to the seed fixture when their
    /// documents are missing; the cart falls back to empty. The coupon
    /// selection is never persisted and always starts cleared.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if a present document cannot be decoded
    /// or the seed fixture does not parse.
    pub fn open(store: S) -> Result<Self, SessionError> {
        let catalog = store::load(&store, PRODUCTS_KEY)?.map_or_else(fixtures::seed_catalog, Ok)?;
        let coupons = store::load(&store, COUPONS_KEY)?.map_or_else(fixtures::seed_coupons, Ok)?;
        let cart = store::load(&store, CART_KEY)?.unwrap_or_default();

        Ok(Session {
            catalog,
            coupons,
            cart,
            selected_coupon: None,
            notifications: NotificationQueue::new(),
            orders: OrderSequence::new(),
            store,
        })
    }

    /// Current catalog snapshot.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current coupon ledger snapshot.
    pub fn coupons(&self) -> &CouponBook {
        &self.coupons
    }

    /// Current cart snapshot.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Pending notifications.
    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Mutable access to the queue, for dismissal by the consumer.
    pub fn notifications_mut(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }

    /// The selected coupon, resolved through the ledger.
    ///
    /// Resolution happens on every read, so a selection whose referent has
    /// gone simply yields `None`.
    pub fn selected_coupon(&self) -> Option<&Coupon> {
        self.selected_coupon
            .as_deref()
            .and_then(|code| self.coupons.find(code))
    }

    /// Authoritative totals for the current cart and selection.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if rate or coupon arithmetic fails.
    pub fn totals(&self) -> Result<Totals, PricingError> {
        pricing::cart_totals(&self.cart, self.selected_coupon())
    }

    /// Stock left for `product` after what the cart already holds.
    pub fn remaining_stock(&self, product: &Product) -> i64 {
        self.cart.remaining_stock(product)
    }

    /// Total number of units across all cart lines.
    pub fn total_item_count(&self) -> u32 {
        self.cart.total_item_count()
    }

    /// Products matching a search term, by name or description.
    pub fn search_products(&self, term: &str) -> Vec<&Product> {
        self.catalog.search(term)
    }

    /// Add one unit of a catalog product to the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] only when persisting the new cart fails;
    /// domain rejections become error notifications and `Ok(false)`.
    pub fn add_to_cart(&mut self, product_id: &str) -> Result<bool, StoreError> {
        let Some(product) = self.catalog.find(product_id).cloned() else {
            self.reject(CatalogError::NotFound {
                id: product_id.to_string(),
            });
            return Ok(false);
        };

        match self.cart.add_item(&product) {
            Ok(cart) => {
                self.cart = cart;
                self.persist_cart()?;
                self.notifications.push("Added to cart", Severity::Success);
                debug!(product = product_id, "added product to cart");
                Ok(true)
            }
            Err(err) => {
                self.reject(err);
                Ok(false)
            }
        }
    }

    /// Remove a product's line from the cart; absent lines are a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when persisting the new cart fails.
    pub fn remove_from_cart(&mut self, product_id: &str) -> Result<(), StoreError> {
        self.cart = self.cart.remove_item(product_id);
        self.persist_cart()
    }

    /// Set a cart line's quantity; non-positive values delete the line.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] only when persisting the new cart fails;
    /// domain rejections become error notifications and `Ok(false)`.
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        new_quantity: i64,
    ) -> Result<bool, StoreError> {
        match self.cart.update_quantity(product_id, new_quantity) {
            Ok(cart) => {
                self.cart = cart;
                self.persist_cart()?;
                Ok(true)
            }
            Err(err) => {
                self.reject(err);
                Ok(false)
            }
        }
    }

    /// Select a coupon by code after the eligibility pre-check.
    ///
    /// Selection is in-memory only; nothing is persisted.
    pub fn apply_coupon(&mut self, code: &str) -> bool {
        let Some(coupon) = self.coupons.find(code).cloned() else {
            self.reject(CouponError::NotFound {
                code: code.to_string(),
            });
            return false;
        };

        match coupons::validate_application(&coupon, &self.cart) {
            Ok(()) => {
                self.selected_coupon = Some(coupon.code);
                self.notifications.push("Coupon applied.", Severity::Success);
                true
            }
            Err(err) => {
                self.reject(err);
                false
            }
        }
    }

    /// Clear the coupon selection without touching the ledger.
    pub fn remove_selected_coupon(&mut self) {
        self.selected_coupon = None;
    }

    /// Empty the cart and clear the coupon selection, both-or-neither.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when persisting the empty cart fails.
    pub fn clear_cart(&mut self) -> Result<(), StoreError> {
        self.cart = Cart::new();
        self.selected_coupon = None;
        self.persist_cart()
    }

    /// Complete the order: generate an identifier and reset cart plus
    /// selection in one step.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when persisting the empty cart fails.
    pub fn complete_order(&mut self) -> Result<OrderId, StoreError> {
        let order_id = self.orders.next_id();

        self.cart = Cart::new();
        self.selected_coupon = None;
        self.persist_cart()?;

        self.notifications.push(
            format!("Order completed. Order number: {order_id}"),
            Severity::Success,
        );
        debug!(%order_id, "completed order");

        Ok(order_id)
    }

    /// Add a coupon to the ledger.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] only when persisting the ledger fails;
    /// domain rejections become error notifications and `Ok(false)`.
    pub fn add_coupon(&mut self, coupon: Coupon) -> Result<bool, StoreError> {
        match self.coupons.add(coupon) {
            Ok(book) => {
                self.coupons = book;
                self.persist_coupons()?;
                self.notifications.push("Coupon added.", Severity::Success);
                Ok(true)
            }
            Err(err) => {
                self.reject(err);
                Ok(false)
            }
        }
    }

    /// Remove a coupon from the ledger, clearing a matching selection.
    ///
    /// The selection is weak by code, so deleting its referent must not
    /// leave it dangling.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] only when persisting the ledger fails;
    /// domain rejections become error notifications and `Ok(false)`.
    pub fn remove_coupon(&mut self, code: &str) -> Result<bool, StoreError> {
        match self.coupons.remove(code) {
            Ok(book) => {
                self.coupons = book;
                if self.selected_coupon.as_deref() == Some(code) {
                    self.selected_coupon = None;
                }
                self.persist_coupons()?;
                self.notifications.push("Coupon deleted.", Severity::Success);
                Ok(true)
            }
            Err(err) => {
                self.reject(err);
                Ok(false)
            }
        }
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] only when persisting the catalog fails;
    /// domain rejections become error notifications and `Ok(false)`.
    pub fn add_product(&mut self, draft: ProductDraft) -> Result<bool, StoreError> {
        let result = self.catalog.add(draft);
        self.apply_catalog(result, "Product added.")
    }

    /// Patch an existing product.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] only when persisting the catalog fails;
    /// domain rejections become error notifications and `Ok(false)`.
    pub fn update_product(&mut self, id: &str, patch: ProductPatch) -> Result<bool, StoreError> {
        let result = self.catalog.update(id, patch);
        self.apply_catalog(result, "Product updated.")
    }

    /// Remove a product from the catalog; cart snapshots are unaffected.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] only when persisting the catalog fails;
    /// domain rejections become error notifications and `Ok(false)`.
    pub fn remove_product(&mut self, id: &str) -> Result<bool, StoreError> {
        let result = self.catalog.remove(id);
        self.apply_catalog(result, "Product deleted.")
    }

    /// Replace a product's stock level.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] only when persisting the catalog fails;
    /// domain rejections become error notifications and `Ok(false)`.
    pub fn update_stock(&mut self, id: &str, new_stock: i64) -> Result<bool, StoreError> {
        let result = self.catalog.update_stock(id, new_stock);
        self.apply_catalog(result, "Stock updated.")
    }

    /// Add a discount tier to a product.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] only when persisting the catalog fails;
    /// domain rejections become error notifications and `Ok(false)`.
    pub fn add_discount_tier(&mut self, id: &str, tier: DiscountTier) -> Result<bool, StoreError> {
        let result = self.catalog.add_discount_tier(id, tier);
        self.apply_catalog(result, "Discount tier added.")
    }

    /// Remove a product's discount tier by position.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] only when persisting the catalog fails;
    /// domain rejections become error notifications and `Ok(false)`.
    pub fn remove_discount_tier(&mut self, id: &str, index: usize) -> Result<bool, StoreError> {
        let result = self.catalog.remove_discount_tier(id, index);
        self.apply_catalog(result, "Discount tier removed.")
    }

    fn apply_catalog(
        &mut self,
        result: Result<Catalog, CatalogError>,
        success: &str,
    ) -> Result<bool, StoreError> {
        match result {
            Ok(catalog) => {
                self.catalog = catalog;
                self.persist_catalog()?;
                self.notifications.push(success, Severity::Success);
                Ok(true)
            }
            Err(err) => {
                self.reject(err);
                Ok(false)
            }
        }
    }

    fn reject(&mut self, err: impl std::error::Error) {
        warn!(%err, "rejected operation");
        self.notifications.push(err.to_string(), Severity::Error);
    }

    fn persist_cart(&mut self) -> Result<(), StoreError> {
        store::save(&mut self.store, CART_KEY, &self.cart)
    }

    fn persist_coupons(&mut self) -> Result<(), StoreError> {
        store::save(&mut self.store, COUPONS_KEY, &self.coupons)
    }

    fn persist_catalog(&mut self) -> Result<(), StoreError> {
        store::save(&mut self.store, PRODUCTS_KEY, &self.catalog)
    }
}

impl<S: DocumentStore> Session<S> {
    /// Consume the session, returning the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{coupons::DiscountType, notifications::Severity, store::MemoryStore};

    use super::*;

    fn open_seeded() -> Result<Session<MemoryStore>, SessionError> {
        Session::open(MemoryStore::new())
    }

    fn coupon(code: &str, discount_type: DiscountType, value: u64) -> Coupon {
        Coupon {
            name: code.to_string(),
            code: code.to_string(),
            discount_type,
            discount_value: Decimal::from(value),
        }
    }

    fn last_severity<S>(session: &Session<S>) -> Option<Severity> {
        session
            .notifications
            .iter()
            .last()
            .map(|notification| notification.severity)
    }

    #[test]
    fn open_falls_back_to_the_seed_fixture() -> TestResult {
        let session = open_seeded()?;

        assert_eq!(session.catalog().len(), 3);
        assert_eq!(session.coupons().len(), 2);
        assert!(session.cart().is_empty());
        assert!(session.selected_coupon().is_none());

        Ok(())
    }

    #[test]
    fn add_to_cart_notifies_and_persists() -> TestResult {
        let mut session = open_seeded()?;

        assert!(session.add_to_cart("p1")?);
        assert_eq!(session.cart().quantity_of("p1"), 1);
        assert_eq!(last_severity(&session), Some(Severity::Success));

        // The cart document is durable: a new session over the same store
        // sees the line.
        let reopened = Session::open(session.into_store())?;
        assert_eq!(reopened.cart().quantity_of("p1"), 1);

        Ok(())
    }

    #[test]
    fn add_to_cart_with_an_unknown_id_is_rejected() -> TestResult {
        let mut session = open_seeded()?;

        assert!(!session.add_to_cart("p99")?);
        assert!(session.cart().is_empty(), "state untouched on failure");
        assert_eq!(last_severity(&session), Some(Severity::Error));

        Ok(())
    }

    #[test]
    fn exhausting_stock_is_rejected_and_leaves_the_cart_alone() -> TestResult {
        let mut session = open_seeded()?;
        session.update_stock("p1", 1)?;

        assert!(session.add_to_cart("p1")?);
        assert!(!session.add_to_cart("p1")?, "second unit exceeds stock 1");
        assert_eq!(session.cart().quantity_of("p1"), 1);

        Ok(())
    }

    #[test]
    fn update_quantity_to_zero_deletes_the_line() -> TestResult {
        let mut session = open_seeded()?;
        session.add_to_cart("p1")?;

        assert!(session.update_quantity("p1", 0)?);
        assert!(session.cart().is_empty());

        Ok(())
    }

    #[test]
    fn percentage_coupon_below_minimum_is_not_selected() -> TestResult {
        let mut session = open_seeded()?;

        // An empty cart totals 0, well under the minimum.
        assert!(!session.apply_coupon("PERCENT10"));
        assert!(session.selected_coupon().is_none());
        assert_eq!(last_severity(&session), Some(Severity::Error));

        Ok(())
    }

    #[test]
    fn amount_coupon_applies_to_a_small_cart() -> TestResult {
        let mut session = open_seeded()?;
        session.add_to_cart("p1")?;

        assert!(session.apply_coupon("AMOUNT5000"));

        let totals = session.totals()?;
        assert_eq!(totals.total_after_discount, 5_000, "10,000 minus 5,000");

        Ok(())
    }

    #[test]
    fn applying_an_unknown_coupon_code_is_rejected() -> TestResult {
        let mut session = open_seeded()?;

        assert!(!session.apply_coupon("NOPE"));
        assert_eq!(last_severity(&session), Some(Severity::Error));

        Ok(())
    }

    #[test]
    fn removing_the_selected_coupon_clears_the_selection() -> TestResult {
        let mut session = open_seeded()?;
        session.add_to_cart("p1")?;
        session.apply_coupon("AMOUNT5000");

        assert!(session.remove_coupon("AMOUNT5000")?);
        assert!(
            session.selected_coupon().is_none(),
            "a selection never outlives its referent"
        );

        Ok(())
    }

    #[test]
    fn removing_a_different_coupon_keeps_the_selection() -> TestResult {
        let mut session = open_seeded()?;
        session.add_to_cart("p1")?;
        session.apply_coupon("AMOUNT5000");

        assert!(session.remove_coupon("PERCENT10")?);
        assert_eq!(
            session.selected_coupon().map(|coupon| coupon.code.as_str()),
            Some("AMOUNT5000")
        );

        Ok(())
    }

    #[test]
    fn duplicate_coupon_codes_are_rejected() -> TestResult {
        let mut session = open_seeded()?;

        assert!(!session.add_coupon(coupon("AMOUNT5000", DiscountType::Amount, 1))?);
        assert_eq!(session.coupons().len(), 2, "ledger unchanged");

        Ok(())
    }

    #[test]
    fn clear_cart_resets_cart_and_selection_together() -> TestResult {
        let mut session = open_seeded()?;
        session.add_to_cart("p1")?;
        session.apply_coupon("AMOUNT5000");

        session.clear_cart()?;

        assert!(session.cart().is_empty());
        assert!(session.selected_coupon().is_none());

        Ok(())
    }

    #[test]
    fn complete_order_clears_state_and_yields_unique_ids() -> TestResult {
        let mut session = open_seeded()?;

        session.add_to_cart("p1")?;
        let first = session.complete_order()?;

        session.add_to_cart("p2")?;
        let second = session.complete_order()?;

        assert_ne!(first, second);
        assert!(session.cart().is_empty());
        assert!(session.selected_coupon().is_none());
        assert_eq!(last_severity(&session), Some(Severity::Success));

        Ok(())
    }

    #[test]
    fn catalog_mutations_flow_through_validation() -> TestResult {
        let mut session = open_seeded()?;

        let bad = ProductDraft {
            name: "  ".to_string(),
            description: None,
            price: 100,
            stock: 1,
            discounts: crate::products::DiscountTiers::new(),
        };

        assert!(!session.add_product(bad)?);
        assert_eq!(session.catalog().len(), 3, "catalog unchanged");
        assert_eq!(last_severity(&session), Some(Severity::Error));

        Ok(())
    }

    #[test]
    fn removing_a_product_keeps_existing_cart_snapshots() -> TestResult {
        let mut session = open_seeded()?;
        session.add_to_cart("p1")?;

        assert!(session.remove_product("p1")?);
        assert_eq!(
            session.cart().quantity_of("p1"),
            1,
            "the cart holds a copy, not a live reference"
        );

        Ok(())
    }
}
