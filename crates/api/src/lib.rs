//! HTTP API server with observability for the storefront.
//!
//! Provides REST endpoints for the catalog, carts, checkout, orders and
//! accounts, with structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use store::StorefrontStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: StorefrontStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // Cart
        .route(
            "/cart",
            get(routes::cart::get::<S>).post(routes::cart::add_item::<S>),
        )
        .route("/cart/validate", get(routes::cart::validate::<S>))
        .route(
            "/cart/items",
            put(routes::cart::update_item::<S>).delete(routes::cart::remove_item::<S>),
        )
        .route("/cart/clear", delete(routes::cart::clear::<S>))
        .route("/cart/transfer", post(routes::cart::transfer::<S>))
        // Orders
        .route(
            "/orders",
            post(routes::orders::checkout::<S>).get(routes::orders::list_mine::<S>),
        )
        .route("/orders/checkout", post(routes::orders::checkout::<S>))
        .route("/orders/all", get(routes::orders::list_all::<S>))
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>).patch(routes::orders::update_status::<S>),
        )
        // Catalog
        .route(
            "/products",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route(
            "/products/{id}",
            get(routes::products::get::<S>)
                .put(routes::products::update::<S>)
                .delete(routes::products::deactivate::<S>),
        )
        // Accounts
        .route(
            "/users",
            post(routes::users::register::<S>).get(routes::users::list::<S>),
        )
        .route(
            "/users/me",
            get(routes::users::me::<S>).patch(routes::users::update_me::<S>),
        )
        .route("/users/{id}/role", patch(routes::users::set_role::<S>))
        .fallback(routes::not_found)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with every service sharing one store.
pub fn create_default_state<S: StorefrontStore>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}
