//! HTTP handlers grouped by resource.

pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod users;

use std::str::FromStr;

use common::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use services::{CartService, CatalogService, CheckoutCoordinator, OrderService, UserService};
use store::StorefrontStore;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: StorefrontStore> {
    pub carts: CartService<S>,
    pub checkout: CheckoutCoordinator<S>,
    pub orders: OrderService<S>,
    pub catalog: CatalogService<S>,
    pub users: UserService<S>,
    pub store: S,
}

impl<S: StorefrontStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            carts: CartService::new(store.clone()),
            checkout: CheckoutCoordinator::new(store.clone()),
            orders: OrderService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            users: UserService::new(store.clone()),
            store,
        }
    }
}

/// `?page=&limit=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
        )
    }
}

#[derive(Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    pub fn from_page<U>(page: Page<U>, f: impl FnMut(U) -> T) -> Self {
        let total_pages = page.total_pages();
        let page = page.map(f);
        Self {
            items: page.items,
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages,
        }
    }
}

/// Parses an identifier taken from the path or body.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {what}: {raw}")))
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
