//! Checkout and order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{OrderId, PageRequest};
use domain::{Order, OrderItem, OrderStatus, Role};
use serde::{Deserialize, Serialize};
use services::CheckoutOutcome;
use store::{OrderQuery, StorefrontStore};

use super::{AppState, PageResponse, parse_id};
use crate::auth::Caller;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AllOrdersParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItemResponse>,
    pub total_amount_cents: i64,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub size: String,
    pub quantity: u32,
    pub price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub order: OrderResponse,
    pub role_promoted: Option<Role>,
    pub warnings: Vec<String>,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            product_name: item.product_name.clone(),
            size: item.size.clone(),
            quantity: item.quantity,
            price_cents: item.price.cents(),
            line_total_cents: item.line_total().cents(),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            status: order.status,
            items: order.items.iter().map(OrderItemResponse::from).collect(),
            total_amount_cents: order.total_amount.cents(),
            shipping_address: order.shipping_address,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

impl From<CheckoutOutcome> for CheckoutResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        Self {
            order: outcome.order.into(),
            role_promoted: outcome.role_promoted,
            warnings: outcome.warnings,
        }
    }
}

fn order_id(raw: &str) -> Result<OrderId, ApiError> {
    parse_id(raw, "order id")
}

// -- Handlers --

/// POST /orders: Turns the caller's cart into an order.
#[tracing::instrument(skip(state, req))]
pub async fn checkout<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let outcome = state
        .checkout
        .create_order_from_cart(user_id, &req.shipping_address)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// GET /orders: The caller's order history, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_mine<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.user_orders(user_id).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// GET /orders/all: Every order, for admins.
#[tracing::instrument(skip(state))]
pub async fn list_all<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Query(params): Query<AllOrdersParams>,
) -> Result<Json<PageResponse<OrderResponse>>, ApiError> {
    let page = PageRequest::new(
        params.page.unwrap_or(1),
        params.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
    );
    let mut query = OrderQuery::new().page(page);
    if let Some(status) = params.status.as_deref().filter(|s| !s.is_empty()) {
        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        query = query.status(status);
    }

    let orders = state.orders.all_orders(query, Some(user_id)).await?;
    Ok(Json(PageResponse::from_page(orders, OrderResponse::from)))
}

/// GET /orders/{id}: One order, visible to its owner and to admins.
#[tracing::instrument(skip(state))]
pub async fn get<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .orders
        .order_details(order_id(&id)?, Some(user_id))
        .await?;
    Ok(Json(order.into()))
}

/// PATCH /orders/{id}: Sets the order status. Admin only.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .orders
        .update_status(order_id(&id)?, &req.status, Some(user_id))
        .await?;
    Ok(Json(order.into()))
}
