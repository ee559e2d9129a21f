//! Integration test for a full shop-to-checkout flow over the seed catalog.
//!
//! Expected totals, worked through by hand:
//!
//! The cart holds 10 Wireless Mice and 1 Mechanical Keyboard.
//!
//! 1. The mouse line reaches its 10-unit tier (10% off) and also trips the
//!    cart-wide bulk bonus (+5%), so it is priced at 15% off:
//!    10 x 10,000 = 100,000 -> 85,000.
//! 2. The keyboard line has no satisfied tier but still receives the
//!    cart-wide 5% bonus: 20,000 -> 19,000.
//! 3. Before discounts: 120,000. After item discounts: 104,000.
//! 4. The 10% coupon then scales the item-discounted total:
//!    104,000 -> 93,600.
//!
//! Checkout clears the cart and the selection and leaves the empty cart
//! persisted.

use testresult::TestResult;

use tally::{
    prelude::*,
    store::{self, CART_KEY},
};

#[test]
fn shop_apply_coupon_and_check_out() -> TestResult {
    let mut session = Session::open(MemoryStore::new())?;

    // Build the cart: one mouse, then grow the line to 10 in one step.
    assert!(session.add_to_cart("p1")?, "seed catalog has p1 in stock");
    assert!(session.update_quantity("p1", 10)?);
    assert!(session.add_to_cart("p2")?);

    assert_eq!(session.total_item_count(), 11);

    // Item-level totals before any coupon.
    let totals = session.totals()?;
    assert_eq!(totals.total_before_discount, 120_000);
    assert_eq!(totals.total_after_discount, 104_000);
    assert_eq!(totals.total_discount, 16_000);

    // The percentage coupon clears its 10,000 minimum easily.
    assert!(session.apply_coupon("PERCENT10"));

    let totals = session.totals()?;
    assert_eq!(totals.total_after_discount, 93_600);
    assert_eq!(totals.total_discount, 26_400);

    // Checkout is the single success event of the whole flow.
    let order_id = session.complete_order()?;
    assert!(order_id.as_str().starts_with("ORD-"), "order id format");
    assert!(session.cart().is_empty());
    assert!(session.selected_coupon().is_none());

    // The empty cart is what got persisted.
    let store = session.into_store();
    let persisted: Option<Cart> = store::load(&store, CART_KEY)?;
    assert_eq!(persisted, Some(Cart::new()));

    Ok(())
}

#[test]
fn rejected_mutations_leave_totals_stable() -> TestResult {
    let mut session = Session::open(MemoryStore::new())?;

    session.add_to_cart("p1")?;
    let before = session.totals()?;

    // Stock on the line snapshot is 20; 21 must be rejected.
    assert!(!session.update_quantity("p1", 21)?);
    assert!(!session.add_to_cart("p99")?);

    assert_eq!(session.totals()?, before, "all-or-nothing mutations");

    Ok(())
}

#[test]
fn bulk_bonus_reaches_every_line_in_the_cart() -> TestResult {
    let mut session = Session::open(MemoryStore::new())?;

    // A keyboard alone: no tier, no bonus.
    session.add_to_cart("p2")?;
    assert_eq!(session.totals()?.total_after_discount, 20_000);

    // Ten mice qualify the whole cart, so the keyboard gets 5% off too.
    session.add_to_cart("p1")?;
    session.update_quantity("p1", 10)?;

    let totals = session.totals()?;
    assert_eq!(totals.total_after_discount, 85_000 + 19_000);

    Ok(())
}

#[test]
fn admin_reshapes_the_catalog_mid_session() -> TestResult {
    let mut session = Session::open(MemoryStore::new())?;

    // A new product with a generated id lands at the end of the catalog.
    let draft = ProductDraft {
        name: "Webcam".to_string(),
        description: Some("1080p webcam with privacy shutter".to_string()),
        price: 15_000,
        stock: 5,
        discounts: DiscountTiers::new(),
    };
    assert!(session.add_product(draft)?);

    let new_id = session
        .catalog()
        .iter()
        .map(|product| product.id.clone())
        .last()
        .unwrap_or_default();
    assert_eq!(new_id, "p4", "ids continue after the seed catalog");

    // Tier rules validate and keep themselves sorted.
    assert!(session.add_discount_tier(
        &new_id,
        DiscountTier {
            quantity: 3,
            rate: 0.1,
        },
    )?);
    assert!(!session.add_discount_tier(
        &new_id,
        DiscountTier {
            quantity: 3,
            rate: 0.2,
        },
    )?);

    // The new product is searchable and shoppable right away.
    assert_eq!(session.search_products("privacy").len(), 1);
    assert!(session.add_to_cart(&new_id)?);
    assert_eq!(session.cart().quantity_of(&new_id), 1);

    Ok(())
}
