//! Integration tests for the cart to order lifecycle.
//!
//! These tests drive the public domain API the way the checkout workflow
//! does: fill a cart, check every line, reserve stock and snapshot an order.

use chrono::Utc;
use domain::{
    Brand, Cart, CartItem, InvalidItemReason, Money, Order, OrderError, OrderStatus, Product,
    Role, SizeStock, StockAdjustment, User, UserId,
};

fn sneaker(name: &str, dollars: i64, sizes: Vec<SizeStock>) -> Product {
    Product::new(name, Brand::Nike, Money::from_dollars(dollars), sizes, Utc::now())
}

#[test]
fn test_cart_becomes_priced_order() {
    let now = Utc::now();
    let mut dunk = sneaker("Dunk", 100, vec![SizeStock::new("40", 5)]);
    let mut cart = Cart::new(UserId::new(), now);

    cart.add_item(CartItem::snapshot(&dunk, "40", 2, now), now);
    cart.add_item(CartItem::snapshot(&dunk, "40", 1, now), now);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.quantity_of(dunk.id, "40"), 3);

    for item in &cart.items {
        assert_eq!(InvalidItemReason::check(Some(&dunk), item), None);
        assert!(dunk.reserve(&item.size, item.quantity, now).is_applied());
    }
    assert_eq!(dunk.size("40").map(|s| s.stock), Some(2));

    let order = Order::from_cart(&cart, " 1 Main St ", now).unwrap();
    assert_eq!(order.total_amount, Money::from_dollars(300));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.shipping_address, "1 Main St");
    assert_eq!(order.items[0].product_name, "Dunk");
    assert!(order.is_owned_by(cart.user_id));
}

#[test]
fn test_order_keeps_snapshot_prices() {
    let now = Utc::now();
    let mut blazer = sneaker("Blazer", 80, vec![SizeStock::new("42", 3)]);
    let mut cart = Cart::new(UserId::new(), now);
    cart.add_item(CartItem::snapshot(&blazer, "42", 1, now), now);

    blazer.price = Money::from_dollars(120);

    let order = Order::from_cart(&cart, "2 Side St", now).unwrap();
    assert_eq!(order.total_amount, Money::from_dollars(80));
    assert_eq!(order.items[0].price, Money::from_dollars(80));
}

#[test]
fn test_stale_lines_are_reported_before_reservation() {
    let now = Utc::now();
    let mut cortez = sneaker(
        "Cortez",
        90,
        vec![SizeStock::new("41", 1), SizeStock::new("43", 4)],
    );
    let mut cart = Cart::new(UserId::new(), now);
    cart.add_item(CartItem::snapshot(&cortez, "41", 2, now), now);
    cart.add_item(CartItem::snapshot(&cortez, "43", 1, now), now);

    let reasons: Vec<_> = cart
        .items
        .iter()
        .filter_map(|item| InvalidItemReason::check(Some(&cortez), item))
        .collect();
    assert_eq!(
        reasons,
        vec![InvalidItemReason::InsufficientStock {
            available: 1,
            requested: 2
        }]
    );

    cortez.is_active = false;
    assert_eq!(
        InvalidItemReason::check(Some(&cortez), &cart.items[1]),
        Some(InvalidItemReason::ProductUnavailable)
    );
    assert_eq!(
        InvalidItemReason::check(None, &cart.items[1]),
        Some(InvalidItemReason::ProductUnavailable)
    );
}

#[test]
fn test_reserve_then_restore_is_balanced() {
    let now = Utc::now();
    let mut vans = Product::new(
        "Old Skool",
        Brand::Vans,
        Money::from_cents(6_500),
        vec![SizeStock::new("39", 2)],
        now,
    );

    assert_eq!(
        vans.reserve("39", 3, now),
        StockAdjustment::Insufficient { available: 2 }
    );
    assert_eq!(
        vans.reserve("39", 2, now),
        StockAdjustment::Applied { remaining: 0 }
    );
    assert!(vans.reserve("45", 1, now).is_skipped());
    assert_eq!(
        vans.restore("39", 2, now),
        StockAdjustment::Applied { remaining: 2 }
    );
}

#[test]
fn test_checkout_preconditions() {
    let now = Utc::now();
    let air = sneaker("Air", 110, vec![SizeStock::new("44", 1)]);
    let empty = Cart::new(UserId::new(), now);

    assert_eq!(
        Order::from_cart(&empty, "   ", now).unwrap_err(),
        OrderError::MissingShippingAddress
    );
    assert_eq!(
        Order::from_cart(&empty, "3 Elm St", now).unwrap_err(),
        OrderError::EmptyCart
    );

    let mut cart = Cart::new(UserId::new(), now);
    cart.add_item(CartItem::snapshot(&air, "44", 1, now), now);
    cart.items[0].price = Money::zero();
    assert_eq!(
        Order::from_cart(&cart, "3 Elm St", now).unwrap_err(),
        OrderError::NonPositiveTotal
    );
}

#[test]
fn test_first_checkout_promotes_guest_only() {
    let now = Utc::now();
    let mut user = User::new("buyer@example.com", "Buyer", "hash", now);
    assert_eq!(user.role_after_checkout(), Some(Role::Customer));

    user.role = Role::Customer;
    assert_eq!(user.role_after_checkout(), None);

    user.role = Role::Admin;
    assert_eq!(user.role_after_checkout(), None);
}
