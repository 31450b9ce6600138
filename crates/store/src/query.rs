use common::{PageRequest, UserId};
use domain::{Brand, Order, OrderStatus, Product};

/// Builder for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Filter by brand.
    pub brand: Option<Brand>,

    /// Include soft-deleted products.
    pub include_inactive: bool,

    pub page: PageRequest,
}

impl ProductQuery {
    /// Creates a query for the first page of active products.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by brand.
    pub fn brand(mut self, brand: Brand) -> Self {
        self.brand = Some(brand);
        self
    }

    /// Includes inactive products.
    pub fn include_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }

    /// Selects a page.
    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// Returns true if the product passes the filters.
    pub fn matches(&self, product: &Product) -> bool {
        if !self.include_inactive && !product.is_active {
            return false;
        }
        if let Some(brand) = self.brand
            && product.brand != brand
        {
            return false;
        }
        true
    }
}

/// Builder for order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// Filter by status.
    pub status: Option<OrderStatus>,

    /// Filter by owner.
    pub user_id: Option<UserId>,

    pub page: PageRequest,
}

impl OrderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters by owner.
    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Selects a page.
    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// Returns true if the order passes the filters.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        if let Some(user_id) = self.user_id
            && order.user_id != user_id
        {
            return false;
        }
        true
    }
}
