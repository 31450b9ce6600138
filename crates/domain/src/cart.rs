//! Per-user shopping carts.

use chrono::{DateTime, Utc};
use common::{ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::product::{Product, ProductError};

/// A cart line.
///
/// `price`, `product_name` and `product_image` are snapshots taken when the
/// line was first added, not live references into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
    pub price: Money,
    pub product_name: String,
    pub product_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CartItem {
    /// Snapshots the product's current price, name and image into a new line.
    pub fn snapshot(product: &Product, size: impl Into<String>, quantity: u32, now: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id,
            size: size.into(),
            quantity,
            price: product.price,
            product_name: product.name.clone(),
            product_image: product.image.clone(),
            created_at: now,
            updated_at: None,
        }
    }

    /// Returns `price * quantity`.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }

    pub fn matches(&self, product_id: ProductId, size: &str) -> bool {
        self.product_id == product_id && self.size == size
    }
}

/// A user's cart.
///
/// Invariant: at most one line per `(product_id, size)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// Creates an empty cart for `user_id`.
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: None,
        }
    }

    /// Recomputes `Σ price × quantity` over the current lines.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Like [`Cart::total`], but `None` if any step overflows.
    pub fn checked_total(&self) -> Option<Money> {
        self.items.iter().try_fold(Money::zero(), |acc, item| {
            acc.checked_add(item.price.checked_multiply(item.quantity)?)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, product_id: ProductId, size: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.matches(product_id, size))
    }

    /// Quantity currently held for a line, zero if absent.
    pub fn quantity_of(&self, product_id: ProductId, size: &str) -> u32 {
        self.item(product_id, size).map_or(0, |i| i.quantity)
    }

    /// Adds a line, or increments the existing line for the same
    /// `(product_id, size)` keeping its original snapshot.
    pub fn add_item(&mut self, item: CartItem, now: DateTime<Utc>) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.matches(item.product_id, &item.size))
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            existing.updated_at = Some(now);
        } else {
            self.items.push(item);
        }
        self.updated_at = Some(now);
    }

    /// Replaces the quantity of a line. A quantity of zero removes it.
    ///
    /// Returns false if no such line exists.
    pub fn set_quantity(
        &mut self,
        product_id: ProductId,
        size: &str,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> bool {
        if quantity == 0 {
            return self.remove_item(product_id, size, now);
        }
        match self.items.iter_mut().find(|i| i.matches(product_id, size)) {
            Some(item) => {
                item.quantity = quantity;
                item.updated_at = Some(now);
                self.updated_at = Some(now);
                true
            }
            None => false,
        }
    }

    /// Removes the line for `(product_id, size)`. Returns false if absent.
    pub fn remove_item(&mut self, product_id: ProductId, size: &str, now: DateTime<Utc>) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !i.matches(product_id, size));
        self.updated_at = Some(now);
        self.items.len() != before
    }

    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.items.clear();
        self.updated_at = Some(now);
    }
}

/// Why a cart line is no longer checkout eligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InvalidItemReason {
    ProductUnavailable,
    SizeUnavailable,
    InsufficientStock { available: u32, requested: u32 },
}

impl InvalidItemReason {
    /// Checks a cart line against the current catalog record.
    pub fn check(product: Option<&Product>, item: &CartItem) -> Option<Self> {
        let Some(product) = product else {
            return Some(InvalidItemReason::ProductUnavailable);
        };
        match product.check_availability(&item.size, item.quantity) {
            Ok(_) => None,
            Err(ProductError::SizeUnavailable { .. }) => Some(InvalidItemReason::SizeUnavailable),
            Err(ProductError::InsufficientStock {
                available,
                requested,
            }) => Some(InvalidItemReason::InsufficientStock {
                available,
                requested,
            }),
            Err(_) => Some(InvalidItemReason::ProductUnavailable),
        }
    }
}

impl std::fmt::Display for InvalidItemReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidItemReason::ProductUnavailable => write!(f, "Product not found or not active"),
            InvalidItemReason::SizeUnavailable => write!(f, "Size not available for this product"),
            InvalidItemReason::InsufficientStock { available, .. } => {
                write!(f, "Not enough stock. Only {available} available.")
            }
        }
    }
}

/// A cart line that failed validation against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidCartItem {
    pub product_id: ProductId,
    pub size: String,
    #[serde(flatten)]
    pub reason: InvalidItemReason,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{Brand, SizeStock};

    fn product(price: i64) -> Product {
        Product::new(
            "Old Skool",
            Brand::Vans,
            Money::from_dollars(price),
            vec![SizeStock::new("40", 5), SizeStock::new("41", 0)],
            Utc::now(),
        )
    }

    #[test]
    fn adding_same_line_twice_sums_quantities() {
        let now = Utc::now();
        let p = product(100);
        let mut cart = Cart::new(UserId::new(), now);

        cart.add_item(CartItem::snapshot(&p, "40", 1, now), now);
        cart.add_item(CartItem::snapshot(&p, "40", 2, now), now);
        cart.add_item(CartItem::snapshot(&p, "41", 1, now), now);

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.quantity_of(p.id, "40"), 3);
        assert!(cart.item(p.id, "40").unwrap().updated_at.is_some());
    }

    #[test]
    fn merge_keeps_original_price_snapshot() {
        let now = Utc::now();
        let mut p = product(100);
        let mut cart = Cart::new(UserId::new(), now);
        cart.add_item(CartItem::snapshot(&p, "40", 1, now), now);

        p.price = Money::from_dollars(150);
        cart.add_item(CartItem::snapshot(&p, "40", 1, now), now);

        assert_eq!(cart.item(p.id, "40").unwrap().price, Money::from_dollars(100));
        assert_eq!(cart.total(), Money::from_dollars(200));
    }

    #[test]
    fn total_tracks_every_mutation() {
        let now = Utc::now();
        let a = product(100);
        let b = product(30);
        let mut cart = Cart::new(UserId::new(), now);

        cart.add_item(CartItem::snapshot(&a, "40", 3, now), now);
        cart.add_item(CartItem::snapshot(&b, "40", 2, now), now);
        assert_eq!(cart.total(), Money::from_dollars(360));

        assert!(cart.set_quantity(a.id, "40", 1, now));
        assert_eq!(cart.total(), Money::from_dollars(160));

        assert!(cart.remove_item(b.id, "40", now));
        assert_eq!(cart.total(), Money::from_dollars(100));

        cart.clear(now);
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn zero_quantity_removes_line() {
        let now = Utc::now();
        let p = product(10);
        let mut cart = Cart::new(UserId::new(), now);
        cart.add_item(CartItem::snapshot(&p, "40", 2, now), now);

        assert!(cart.set_quantity(p.id, "40", 0, now));
        assert!(cart.is_empty());
        assert!(!cart.set_quantity(p.id, "40", 3, now));
    }

    #[test]
    fn check_reports_each_reason() {
        let now = Utc::now();
        let mut p = product(10);
        let ok = CartItem::snapshot(&p, "40", 5, now);
        let too_many = CartItem::snapshot(&p, "40", 6, now);
        let bad_size = CartItem::snapshot(&p, "46", 1, now);

        assert_eq!(InvalidItemReason::check(Some(&p), &ok), None);
        assert_eq!(
            InvalidItemReason::check(Some(&p), &too_many),
            Some(InvalidItemReason::InsufficientStock {
                available: 5,
                requested: 6
            })
        );
        assert_eq!(
            InvalidItemReason::check(Some(&p), &bad_size),
            Some(InvalidItemReason::SizeUnavailable)
        );
        assert_eq!(
            InvalidItemReason::check(None, &ok),
            Some(InvalidItemReason::ProductUnavailable)
        );

        p.is_active = false;
        assert_eq!(
            InvalidItemReason::check(Some(&p), &ok),
            Some(InvalidItemReason::ProductUnavailable)
        );
    }
}
