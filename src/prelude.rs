//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{Catalog, CatalogError},
    coupons::{Coupon, CouponBook, CouponError, DiscountType, validate_application},
    discounts::{
        BULK_PURCHASE_BONUS, BULK_PURCHASE_THRESHOLD, DiscountError, MAX_DISCOUNT_RATE,
        effective_discount_rate, has_bulk_purchase, quantity_discount_rate,
    },
    fixtures::FixtureError,
    notifications::{Notification, NotificationQueue, Severity},
    orders::{OrderId, OrderSequence},
    pricing::{PricingError, Totals, cart_totals, line_total},
    products::{DiscountTier, DiscountTiers, Product, ProductDraft, ProductPatch},
    session::{Session, SessionError},
    store::{DocumentStore, MemoryStore, StoreError},
};
