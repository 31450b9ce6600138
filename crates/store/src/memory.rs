use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{OrderId, Page, PageRequest, ProductId, UserId};
use domain::{Cart, CartItem, Order, OrderStatus, Product, Role, StockAdjustment, User};
use tokio::sync::RwLock;

use crate::{
    CartStore, CatalogStore, OrderQuery, OrderStore, ProductQuery, Result, StoreError, UserStore,
};

/// Failures the in-memory store can be told to produce.
#[derive(Debug, Clone, Default)]
struct Faults {
    order_writes: bool,
    stock_restores: bool,
    role_updates: bool,
    /// Size whose stock is sold out from under the next reservation.
    sell_out_before_reserve: Option<(ProductId, String)>,
}

#[derive(Debug, Default)]
struct MemoryState {
    products: HashMap<ProductId, Product>,
    users: HashMap<UserId, User>,
    carts: HashMap<UserId, Cart>,
    /// Insertion order; listings walk it backwards for newest first.
    orders: Vec<Order>,
    faults: Faults,
}

/// In-memory store implementation for tests and local runs.
///
/// Provides the same interface as the PostgreSQL implementation, plus fault
/// injection for the failure paths of checkout.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every order insert fail with `Unavailable`.
    pub async fn fail_order_writes(&self, fail: bool) {
        self.state.write().await.faults.order_writes = fail;
    }

    /// Makes every stock restoration fail with `Unavailable`.
    pub async fn fail_stock_restores(&self, fail: bool) {
        self.state.write().await.faults.stock_restores = fail;
    }

    /// Makes every role update fail with `Unavailable`.
    pub async fn fail_role_updates(&self, fail: bool) {
        self.state.write().await.faults.role_updates = fail;
    }

    /// Empties a size just before the next reservation of it, as if another
    /// buyer had taken the last pairs. Fires once.
    pub async fn sell_out_before_reserve(&self, id: ProductId, size: &str) {
        self.state.write().await.faults.sell_out_before_reserve = Some((id, size.to_string()));
    }

    /// Current stock of a product size, if both exist.
    pub async fn stock_of(&self, id: ProductId, size: &str) -> Option<u32> {
        self.state
            .read()
            .await
            .products
            .get(&id)
            .and_then(|p| p.size(size))
            .map(|s| s.stock)
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Removes a product outright, bypassing soft delete.
    pub async fn purge_product(&self, id: ProductId) {
        self.state.write().await.products.remove(&id);
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.state
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<_> = state
            .products
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(Page::from_vec(products, query.page))
    }

    async fn update_product(&self, product: &Product) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.products.get_mut(&product.id) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = product.clone();
                existing.created_at = created_at;
                existing.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_product_active(&self, id: ProductId, active: bool) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.products.get_mut(&id) {
            Some(product) => {
                product.is_active = active;
                product.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reserve_stock(
        &self,
        id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<StockAdjustment> {
        let mut state = self.state.write().await;
        let sell_out = state
            .faults
            .sell_out_before_reserve
            .as_ref()
            .is_some_and(|(pid, s)| *pid == id && s == size);
        if sell_out {
            state.faults.sell_out_before_reserve = None;
        }
        Ok(match state.products.get_mut(&id) {
            Some(product) => {
                if sell_out {
                    if let Some(entry) = product.sizes.iter_mut().find(|s| s.size == size) {
                        entry.stock = 0;
                    }
                }
                product.reserve(size, quantity, Utc::now())
            }
            None => StockAdjustment::ProductMissing,
        })
    }

    async fn restore_stock(
        &self,
        id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<StockAdjustment> {
        let mut state = self.state.write().await;
        if state.faults.stock_restores {
            return Err(StoreError::Unavailable(
                "stock restore rejected".to_string(),
            ));
        }
        Ok(match state.products.get_mut(&id) {
            Some(product) => product.restore(size, quantity, Utc::now()),
            None => StockAdjustment::ProductMissing,
        })
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail(user.email.clone()));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<User>> {
        let state = self.state.read().await;
        let mut users: Vec<_> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.email.cmp(&b.email)));
        Ok(Page::from_vec(users, page))
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.faults.role_updates {
            return Err(StoreError::Unavailable("role update rejected".to_string()));
        }
        match state.users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                user.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_display_name(&self, id: UserId, display_name: &str) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&id).map(|user| {
            user.display_name = display_name.to_string();
            user.updated_at = Some(Utc::now());
            user.clone()
        }))
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn find_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        Ok(self.state.read().await.carts.get(&user_id).cloned())
    }

    async fn add_cart_item(&self, user_id: UserId, item: CartItem) -> Result<Cart> {
        let now = Utc::now();
        let mut state = self.state.write().await;
        let cart = state
            .carts
            .entry(user_id)
            .or_insert_with(|| Cart::new(user_id, now));
        cart.add_item(item, now);
        Ok(cart.clone())
    }

    async fn set_cart_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<Option<Cart>> {
        let mut state = self.state.write().await;
        Ok(state.carts.get_mut(&user_id).map(|cart| {
            cart.set_quantity(product_id, size, quantity, Utc::now());
            cart.clone()
        }))
    }

    async fn remove_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
    ) -> Result<Option<Cart>> {
        let mut state = self.state.write().await;
        Ok(state.carts.get_mut(&user_id).map(|cart| {
            cart.remove_item(product_id, size, Utc::now());
            cart.clone()
        }))
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        let mut state = self.state.write().await;
        Ok(state.carts.get_mut(&user_id).map(|cart| {
            cart.clear(Utc::now());
            cart.clone()
        }))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        let mut state = self.state.write().await;
        if state.faults.order_writes {
            return Err(StoreError::Unavailable("order write rejected".to_string()));
        }
        state.orders.push(order.clone());
        Ok(())
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self
            .state
            .read()
            .await
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self
            .state
            .read()
            .await
            .orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_orders(&self, query: &OrderQuery) -> Result<Page<Order>> {
        let state = self.state.read().await;
        let orders: Vec<_> = state
            .orders
            .iter()
            .rev()
            .filter(|o| query.matches(o))
            .cloned()
            .collect();
        Ok(Page::from_vec(orders, query.page))
    }

    async fn set_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Option<Order>> {
        let mut state = self.state.write().await;
        Ok(state.orders.iter_mut().find(|o| o.id == id).map(|order| {
            order.set_status(status, Utc::now());
            order.clone()
        }))
    }
}
