use async_trait::async_trait;
use common::{OrderId, Page, PageRequest, ProductId, UserId};
use domain::{Cart, CartItem, Order, OrderStatus, Product, Role, StockAdjustment, User};

use crate::{OrderQuery, ProductQuery, Result};

/// Product catalog persistence.
///
/// Stock is shared mutable state: admin edits and checkout both change it.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Inserts a new product.
    async fn insert_product(&self, product: &Product) -> Result<()>;

    /// Finds a product by ID, active or not.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists products matching the query, ordered by name.
    async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>>;

    /// Replaces every editable field of an existing product, size list
    /// included. Returns false if the product does not exist.
    async fn update_product(&self, product: &Product) -> Result<bool>;

    /// Sets the active flag. Returns false if the product does not exist.
    async fn set_product_active(&self, id: ProductId, active: bool) -> Result<bool>;

    /// Atomically decrements the stock of `size` by `quantity` if, and only
    /// if, at least `quantity` units are available.
    ///
    /// A product or size that no longer exists is reported, not raised.
    async fn reserve_stock(
        &self,
        id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<StockAdjustment>;

    /// Increments the stock of `size` by `quantity`.
    ///
    /// A product or size that no longer exists is reported, not raised.
    async fn restore_stock(
        &self,
        id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<StockAdjustment>;
}

/// User account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new account. Fails with `DuplicateEmail` if taken.
    async fn insert_user(&self, user: &User) -> Result<()>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Lists accounts ordered by creation time.
    async fn list_users(&self, page: PageRequest) -> Result<Page<User>>;

    /// Sets the role of an account. Returns false if it does not exist.
    async fn set_role(&self, id: UserId, role: Role) -> Result<bool>;

    /// Replaces the display name. Returns `None` if the account does not exist.
    async fn set_display_name(&self, id: UserId, display_name: &str) -> Result<Option<User>>;
}

/// Cart persistence. One cart per user, created lazily on the first add.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_cart(&self, user_id: UserId) -> Result<Option<Cart>>;

    /// Appends a line, or increments the quantity of the existing line with
    /// the same `(product_id, size)`. Creates the cart if needed.
    async fn add_cart_item(&self, user_id: UserId, item: CartItem) -> Result<Cart>;

    /// Overwrites the quantity of a line; zero removes it.
    ///
    /// Returns `None` if the user has no cart.
    async fn set_cart_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<Option<Cart>>;

    /// Removes a line. Returns `None` if the user has no cart.
    async fn remove_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
    ) -> Result<Option<Cart>>;

    /// Empties the cart. Returns `None` if the user has no cart.
    async fn clear_cart(&self, user_id: UserId) -> Result<Option<Cart>>;
}

/// Order persistence. Orders are never deleted.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> Result<()>;

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Orders placed by a user, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Orders matching the query, newest first.
    async fn list_orders(&self, query: &OrderQuery) -> Result<Page<Order>>;

    /// Sets the status of an order and returns it, or `None` if missing.
    async fn set_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Option<Order>>;
}

/// A backend implementing every storefront store.
pub trait StorefrontStore:
    CatalogStore + UserStore + CartStore + OrderStore + Clone + 'static
{
}

impl<T> StorefrontStore for T where
    T: CatalogStore + UserStore + CartStore + OrderStore + Clone + 'static
{
}
