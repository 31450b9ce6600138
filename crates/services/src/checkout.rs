//! Checkout coordinator: turns a cart into an order.

use std::time::Instant;

use chrono::Utc;
use common::UserId;
use domain::{InvalidItemReason, Order, OrderError, Role, User};
use store::StorefrontStore;

use crate::access;
use crate::error::{Result, ServiceError};
use crate::state::CheckoutStage;
use crate::stock::{ReservedLine, StockKeeper};

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// The persisted order.
    pub order: Order,

    /// The role the buyer was moved to, if any.
    pub role_promoted: Option<Role>,

    /// Non-fatal problems met after the order was committed.
    pub warnings: Vec<String>,
}

/// Orchestrates a checkout attempt.
///
/// Stock is reserved before the order exists. Any failure after the first
/// reservation restores exactly the lines that were reserved, in the same
/// failure handler, before the error reaches the caller.
pub struct CheckoutCoordinator<S> {
    store: S,
    stock: StockKeeper<S>,
}

impl<S: StorefrontStore> CheckoutCoordinator<S> {
    /// Creates a new checkout coordinator.
    pub fn new(store: S) -> Self {
        Self {
            stock: StockKeeper::new(store.clone()),
            store,
        }
    }

    /// Creates an order from the user's cart.
    ///
    /// The cart itself is left untouched.
    #[tracing::instrument(skip(self, shipping_address), fields(%user_id))]
    pub async fn create_order_from_cart(
        &self,
        user_id: UserId,
        shipping_address: &str,
    ) -> Result<CheckoutOutcome> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = Instant::now();

        let result = self.run(user_id, shipping_address).await;

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        result
    }

    async fn run(&self, user_id: UserId, shipping_address: &str) -> Result<CheckoutOutcome> {
        let stage = enter(CheckoutStage::Validate);
        let (user, order) = match self.validate(user_id, shipping_address).await {
            Ok(validated) => validated,
            Err(e) => return Err(self.fail(stage, &[], e).await),
        };

        let stage = enter(CheckoutStage::ReserveStock);
        let mut ledger = Vec::with_capacity(order.items.len());
        if let Err(e) = self.stock.reserve_all(&order.items, &mut ledger).await {
            return Err(self.fail(stage, &ledger, e).await);
        }

        let stage = enter(CheckoutStage::PersistOrder);
        if let Err(e) = self.store.insert_order(&order).await {
            let err = ServiceError::Internal(format!("Order creation failed: {e}"));
            return Err(self.fail(stage, &ledger, err).await);
        }

        enter(CheckoutStage::PromoteRole);
        let (role_promoted, warnings) = self.promote(&user).await;

        let stage = enter(CheckoutStage::Done);
        debug_assert!(stage.is_terminal());
        metrics::counter!("checkout_completed_total").increment(1);
        tracing::info!(
            order_id = %order.id,
            total = %order.total_amount,
            lines = order.items.len(),
            "checkout completed"
        );

        Ok(CheckoutOutcome {
            order,
            role_promoted,
            warnings,
        })
    }

    /// Checks everything that can be checked without mutating state, and
    /// builds the pending order.
    async fn validate(&self, user_id: UserId, shipping_address: &str) -> Result<(User, Order)> {
        let user = access::load_shopper(&self.store, user_id).await?;

        if shipping_address.trim().is_empty() {
            return Err(OrderError::MissingShippingAddress.into());
        }

        let cart = self
            .store
            .find_cart(user_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(OrderError::EmptyCart)?;

        for item in &cart.items {
            let product = self.store.find_product(item.product_id).await?;
            if let Some(reason) = InvalidItemReason::check(product.as_ref(), item) {
                return Err(ServiceError::Invalid(format!(
                    "Cannot create order: {} (size {}): {reason}",
                    item.product_name, item.size
                )));
            }
        }

        let order = Order::from_cart(&cart, shipping_address, Utc::now())?;
        Ok((user, order))
    }

    /// Upgrades a first-time buyer. Never fails the checkout.
    async fn promote(&self, user: &User) -> (Option<Role>, Vec<String>) {
        let Some(next) = user.role_after_checkout() else {
            return (None, Vec::new());
        };

        match self.store.set_role(user.id, next).await {
            Ok(true) => {
                tracing::info!(user_id = %user.id, role = %next, "role promoted");
                (Some(next), Vec::new())
            }
            Ok(false) => {
                tracing::warn!(user_id = %user.id, "role promotion skipped, user no longer exists");
                (None, vec![format!("Role upgrade to {next} skipped: user not found")])
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "role promotion failed");
                (None, vec![format!("Role upgrade to {next} failed: {e}")])
            }
        }
    }

    /// Failure handler for every fatal stage.
    ///
    /// Restores the ledger when the stage requires it, then returns the
    /// original error unchanged.
    async fn fail(
        &self,
        stage: CheckoutStage,
        ledger: &[ReservedLine],
        err: ServiceError,
    ) -> ServiceError {
        metrics::counter!("checkout_failed_total", "stage" => stage.as_str()).increment(1);

        if stage.needs_compensation() && !ledger.is_empty() {
            enter(CheckoutStage::Compensate);
            tracing::warn!(
                failed_stage = %stage,
                lines = ledger.len(),
                error = %err,
                "checkout failed after reserving stock, compensating"
            );
            metrics::counter!("stock_compensations_total").increment(1);
            let restored = self.stock.restore_all(ledger).await;
            if restored < ledger.len() {
                tracing::error!(
                    restored,
                    reserved = ledger.len(),
                    "compensation incomplete"
                );
            }
        }

        let stage_after = enter(CheckoutStage::Aborted);
        tracing::info!(
            failed_stage = %stage,
            state = %stage_after,
            kind = err.kind(),
            error = %err,
            "checkout aborted"
        );
        err
    }
}

fn enter(stage: CheckoutStage) -> CheckoutStage {
    tracing::debug!(%stage, "checkout stage entered");
    stage
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Brand, CartItem, Money, Product, SizeStock};
    use store::{CartStore, CatalogStore, InMemoryStore, OrderStore, UserStore};

    async fn setup(stock: u32) -> (CheckoutCoordinator<InMemoryStore>, InMemoryStore, User, Product) {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let user = User::new("buyer@example.com", "Buyer", "hash", now);
        store.insert_user(&user).await.unwrap();

        let product = Product::new(
            "Air Force 1",
            Brand::Nike,
            Money::from_dollars(100),
            vec![SizeStock::new("40", stock)],
            now,
        );
        store.insert_product(&product).await.unwrap();

        (CheckoutCoordinator::new(store.clone()), store, user, product)
    }

    async fn add_to_cart(store: &InMemoryStore, user: &User, product: &Product, quantity: u32) {
        store
            .add_cart_item(user.id, CartItem::snapshot(product, "40", quantity, Utc::now()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_happy_path() {
        let (coordinator, store, user, product) = setup(5).await;
        add_to_cart(&store, &user, &product, 3).await;

        let outcome = coordinator
            .create_order_from_cart(user.id, "123 Main St")
            .await
            .unwrap();

        assert_eq!(outcome.order.total_amount, Money::from_dollars(300));
        assert_eq!(outcome.role_promoted, Some(Role::Customer));
        assert!(outcome.warnings.is_empty());
        assert_eq!(store.stock_of(product.id, "40").await, Some(2));
        assert!(store.find_order(outcome.order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_persistence_failure_restores_stock() {
        let (coordinator, store, user, product) = setup(5).await;
        add_to_cart(&store, &user, &product, 3).await;
        store.fail_order_writes(true).await;

        let result = coordinator.create_order_from_cart(user.id, "123 Main St").await;

        assert!(matches!(result, Err(ServiceError::Internal(_))));
        assert_eq!(store.stock_of(product.id, "40").await, Some(5));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_cart_is_invalid() {
        let (coordinator, _store, user, _product) = setup(5).await;

        let result = coordinator.create_order_from_cart(user.id, "123 Main St").await;
        match result {
            Err(ServiceError::Invalid(msg)) => {
                assert_eq!(msg, "Cannot create order from an empty cart")
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_address_is_checked_before_cart() {
        let (coordinator, _store, user, _product) = setup(5).await;

        let result = coordinator.create_order_from_cart(user.id, "  ").await;
        match result {
            Err(ServiceError::Invalid(msg)) => assert_eq!(msg, "Shipping address is required"),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let (coordinator, _, _, _) = setup(5).await;
        let result = coordinator
            .create_order_from_cart(UserId::new(), "123 Main St")
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
