use chrono::Utc;
use common::UserId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Brand, Cart, CartItem, InvalidItemReason, Money, Order, Product, SizeStock};

fn catalog(n: usize) -> Vec<Product> {
    let now = Utc::now();
    (0..n)
        .map(|i| {
            Product::new(
                format!("Bench Sneaker {i}"),
                Brand::Nike,
                Money::from_cents(9_999 + i as i64),
                vec![SizeStock::new("40", 50), SizeStock::new("41", 50)],
                now,
            )
        })
        .collect()
}

fn filled_cart(products: &[Product]) -> Cart {
    let now = Utc::now();
    let mut cart = Cart::new(UserId::new(), now);
    for product in products {
        cart.add_item(CartItem::snapshot(product, "40", 2, now), now);
    }
    cart
}

fn bench_add_item_merge(c: &mut Criterion) {
    let products = catalog(50);

    c.bench_function("domain/cart_add_item_merge", |b| {
        b.iter(|| {
            let mut cart = filled_cart(&products);
            let now = Utc::now();
            for product in &products {
                cart.add_item(CartItem::snapshot(product, "40", 1, now), now);
            }
            cart
        });
    });
}

fn bench_cart_total(c: &mut Criterion) {
    let products = catalog(50);
    let cart = filled_cart(&products);

    c.bench_function("domain/cart_total", |b| {
        b.iter(|| cart.total());
    });
}

fn bench_validate_lines(c: &mut Criterion) {
    let products = catalog(50);
    let cart = filled_cart(&products);

    c.bench_function("domain/validate_cart_lines", |b| {
        b.iter(|| {
            cart.items
                .iter()
                .zip(&products)
                .filter_map(|(item, product)| InvalidItemReason::check(Some(product), item))
                .count()
        });
    });
}

fn bench_order_from_cart(c: &mut Criterion) {
    let products = catalog(50);
    let cart = filled_cart(&products);

    c.bench_function("domain/order_from_cart", |b| {
        b.iter(|| Order::from_cart(&cart, "123 Main St", Utc::now()).unwrap());
    });
}

criterion_group!(
    benches,
    bench_add_item_merge,
    bench_cart_total,
    bench_validate_lines,
    bench_order_from_cart
);
criterion_main!(benches);
