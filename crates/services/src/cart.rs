//! Cart workflows.

use chrono::Utc;
use common::{ProductId, UserId};
use domain::{Cart, CartItem, InvalidCartItem, InvalidItemReason, ProductError};
use store::StorefrontStore;

use crate::access;
use crate::error::{Result, ServiceError};

/// A cart together with the lines removed while reconciling it.
#[derive(Debug, Clone)]
pub struct ReconciledCart {
    pub cart: Cart,
    pub invalid_items_removed: Vec<InvalidCartItem>,
}

/// A line held client-side before the shopper signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestCartItem {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
}

/// Cart operations for a single store backend.
#[derive(Clone)]
pub struct CartService<S> {
    store: S,
}

impl<S: StorefrontStore> CartService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the user's cart, or an empty unpersisted one.
    ///
    /// Pure: nothing is written.
    #[tracing::instrument(skip(self))]
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart> {
        access::load_user(&self.store, user_id).await?;
        let cart = self.store.find_cart(user_id).await?;
        Ok(or_empty(user_id, cart))
    }

    /// Lists every line that is no longer checkout eligible.
    ///
    /// Pure: nothing is written.
    #[tracing::instrument(skip(self))]
    pub async fn validate(&self, user_id: UserId) -> Result<Vec<InvalidCartItem>> {
        let cart = self.get_or_create(user_id).await?;
        self.invalid_items(&cart).await
    }

    /// Returns the cart after removing every line that fails validation.
    ///
    /// The returned cart is always checkout eligible at the time of the read.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_and_reconcile(&self, user_id: UserId) -> Result<ReconciledCart> {
        let cart = self.get_or_create(user_id).await?;
        let invalid = self.invalid_items(&cart).await?;
        if invalid.is_empty() {
            return Ok(ReconciledCart {
                cart,
                invalid_items_removed: invalid,
            });
        }

        let mut cart = cart;
        for item in &invalid {
            if let Some(updated) = self
                .store
                .remove_cart_item(user_id, item.product_id, &item.size)
                .await?
            {
                cart = updated;
            }
        }

        metrics::counter!("cart_items_reconciled_total").increment(invalid.len() as u64);
        tracing::info!(removed = invalid.len(), "stale cart items removed");

        Ok(ReconciledCart {
            cart,
            invalid_items_removed: invalid,
        })
    }

    /// Adds `quantity` units of a product size, merging with an existing line.
    ///
    /// A missing or zero quantity counts as one.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
        quantity: Option<u32>,
    ) -> Result<Cart> {
        access::load_shopper(&self.store, user_id).await?;
        let quantity = quantity.filter(|q| *q > 0).unwrap_or(1);

        let product = self
            .store
            .find_product(product_id)
            .await?
            .ok_or_else(ServiceError::product_not_found)?;
        product.check_availability(size, quantity)?;

        let item = CartItem::snapshot(&product, size, quantity, Utc::now());
        Ok(self.store.add_cart_item(user_id, item).await?)
    }

    /// Sets the quantity of a line. Zero removes it.
    ///
    /// Only the increase over the current quantity is checked against stock,
    /// so a reduction always succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<Cart> {
        if quantity == 0 {
            return self.remove_item(user_id, product_id, size).await;
        }

        access::load_shopper(&self.store, user_id).await?;

        let product = self
            .store
            .find_product(product_id)
            .await?
            .ok_or_else(ServiceError::product_not_found)?;
        let entry = product.size(size).ok_or_else(|| ProductError::SizeUnavailable {
            size: size.to_string(),
        })?;

        let current = self
            .store
            .find_cart(user_id)
            .await?
            .map_or(0, |cart| cart.quantity_of(product_id, size));
        if quantity > current && entry.stock < quantity - current {
            return Err(ServiceError::Invalid(format!(
                "Not enough stock. Only {} additional items available.",
                entry.stock
            )));
        }

        let updated = self
            .store
            .set_cart_item_quantity(user_id, product_id, size, quantity)
            .await?;
        Ok(or_empty(user_id, updated))
    }

    /// Removes a line. Absent lines are ignored.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
    ) -> Result<Cart> {
        access::load_shopper(&self.store, user_id).await?;
        let updated = self
            .store
            .remove_cart_item(user_id, product_id, size)
            .await?;
        Ok(or_empty(user_id, updated))
    }

    /// Empties the cart.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<Cart> {
        access::load_shopper(&self.store, user_id).await?;
        let updated = self.store.clear_cart(user_id).await?;
        Ok(or_empty(user_id, updated))
    }

    /// Merges a client-held cart by replaying `add_item` per line.
    ///
    /// Lines that fail validation are skipped; the rest are still added.
    #[tracing::instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn transfer_guest_cart(
        &self,
        user_id: UserId,
        items: Vec<GuestCartItem>,
    ) -> Result<ReconciledCart> {
        access::load_shopper(&self.store, user_id).await?;

        for item in items {
            if let Err(e) = self
                .add_item(user_id, item.product_id, &item.size, Some(item.quantity))
                .await
            {
                if let ServiceError::Internal(_) = e {
                    return Err(e);
                }
                tracing::warn!(
                    product_id = %item.product_id,
                    size = %item.size,
                    error = %e,
                    "guest cart item skipped"
                );
            }
        }

        self.fetch_and_reconcile(user_id).await
    }

    async fn invalid_items(&self, cart: &Cart) -> Result<Vec<InvalidCartItem>> {
        let mut invalid = Vec::new();
        for item in &cart.items {
            let product = self.store.find_product(item.product_id).await?;
            if let Some(reason) = InvalidItemReason::check(product.as_ref(), item) {
                invalid.push(InvalidCartItem {
                    product_id: item.product_id,
                    size: item.size.clone(),
                    reason,
                });
            }
        }
        Ok(invalid)
    }
}

/// Users without a cart get an empty, unpersisted one back.
fn or_empty(user_id: UserId, cart: Option<Cart>) -> Cart {
    cart.unwrap_or_else(|| Cart::new(user_id, Utc::now()))
}
