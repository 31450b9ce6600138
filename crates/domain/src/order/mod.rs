//! Orders snapshotted from carts.

mod status;

pub use status::OrderStatus;

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::Cart;
use crate::money::Money;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Status outside the five known values.
    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    /// Checkout attempted on a missing or empty cart.
    #[error("Cannot create order from an empty cart")]
    EmptyCart,

    /// Shipping address is blank.
    #[error("Shipping address is required")]
    MissingShippingAddress,

    /// Recomputed total is zero or negative.
    #[error("Order total must be greater than zero")]
    NonPositiveTotal,

    /// Recomputed total does not fit in the money type.
    #[error("Order total is too large")]
    TotalOverflow,
}

/// A price-locked copy of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
    pub price: Money,
    pub product_name: String,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns `price * quantity`.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// A placed order. Only `status` and `updated_at` change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Money,
    pub shipping_address: String,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Builds a pending order from the cart's current lines.
    ///
    /// The total is recomputed from the cart's price snapshots.
    pub fn from_cart(
        cart: &Cart,
        shipping_address: &str,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        let shipping_address = shipping_address.trim();
        if shipping_address.is_empty() {
            return Err(OrderError::MissingShippingAddress);
        }
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let total_amount = cart.checked_total().ok_or(OrderError::TotalOverflow)?;
        if !total_amount.is_positive() {
            return Err(OrderError::NonPositiveTotal);
        }

        let items = cart
            .items
            .iter()
            .map(|item| OrderItem {
                product_id: item.product_id,
                size: item.size.clone(),
                quantity: item.quantity,
                price: item.price,
                product_name: item.product_name.clone(),
                created_at: item.created_at,
            })
            .collect();

        Ok(Order {
            id: OrderId::new(),
            user_id: cart.user_id,
            total_amount,
            shipping_address: shipping_address.to_string(),
            items,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: None,
        })
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(now);
    }
}
