//! Shopping cart endpoints. Every route acts on the caller's own cart.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use common::ProductId;
use domain::{Cart, CartItem, InvalidCartItem};
use serde::{Deserialize, Serialize};
use services::{GuestCartItem, ReconciledCart};
use store::StorefrontStore;

use super::{AppState, parse_id};
use crate::auth::Caller;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub size: String,
    pub quantity: Option<u32>,
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub product_id: String,
    pub size: String,
    /// Values at or below zero remove the line.
    pub quantity: i64,
}

#[derive(Deserialize)]
pub struct RemoveItemRequest {
    pub product_id: String,
    pub size: String,
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub items: Vec<AddItemRequest>,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
    pub item_count: u32,
    pub total_cents: i64,
    pub invalid_items_removed: Vec<InvalidCartItem>,
}

#[derive(Serialize)]
pub struct CartItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub size: String,
    pub quantity: u32,
    pub price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub invalid_items: Vec<InvalidCartItem>,
}

impl From<&CartItem> for CartItemResponse {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            product_name: item.product_name.clone(),
            product_image: item.product_image.clone(),
            size: item.size.clone(),
            quantity: item.quantity,
            price_cents: item.price.cents(),
            line_total_cents: item.line_total().cents(),
        }
    }
}

impl CartResponse {
    fn new(cart: &Cart, invalid_items_removed: Vec<InvalidCartItem>) -> Self {
        Self {
            user_id: cart.user_id.to_string(),
            items: cart.items.iter().map(CartItemResponse::from).collect(),
            item_count: cart.items.iter().map(|i| i.quantity).sum(),
            total_cents: cart.total().cents(),
            invalid_items_removed,
        }
    }
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self::new(&cart, Vec::new())
    }
}

impl From<ReconciledCart> for CartResponse {
    fn from(reconciled: ReconciledCart) -> Self {
        Self::new(&reconciled.cart, reconciled.invalid_items_removed)
    }
}

fn product_id(raw: &str) -> Result<ProductId, ApiError> {
    parse_id(raw, "product_id")
}

// -- Handlers --

/// GET /cart: The caller's cart with unavailable lines removed.
#[tracing::instrument(skip(state))]
pub async fn get<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
) -> Result<Json<CartResponse>, ApiError> {
    let reconciled = state.carts.fetch_and_reconcile(user_id).await?;
    Ok(Json(reconciled.into()))
}

/// GET /cart/validate: Reports unavailable lines without touching the cart.
#[tracing::instrument(skip(state))]
pub async fn validate<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
) -> Result<Json<ValidationResponse>, ApiError> {
    let invalid_items = state.carts.validate(user_id).await?;
    Ok(Json(ValidationResponse {
        valid: invalid_items.is_empty(),
        invalid_items,
    }))
}

/// POST /cart: Adds a quantity of one size to the cart.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let product_id = product_id(&req.product_id)?;
    let cart = state
        .carts
        .add_item(user_id, product_id, &req.size, req.quantity)
        .await?;
    Ok(Json(cart.into()))
}

/// PUT /cart/items: Sets the quantity of a line.
#[tracing::instrument(skip(state, req))]
pub async fn update_item<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let product_id = product_id(&req.product_id)?;
    let quantity = u32::try_from(req.quantity.max(0)).unwrap_or(u32::MAX);
    let cart = state
        .carts
        .update_item_quantity(user_id, product_id, &req.size, quantity)
        .await?;
    Ok(Json(cart.into()))
}

/// DELETE /cart/items: Removes a line.
#[tracing::instrument(skip(state, req))]
pub async fn remove_item<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Json(req): Json<RemoveItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let product_id = product_id(&req.product_id)?;
    let cart = state
        .carts
        .remove_item(user_id, product_id, &req.size)
        .await?;
    Ok(Json(cart.into()))
}

/// DELETE /cart/clear: Empties the cart.
#[tracing::instrument(skip(state))]
pub async fn clear<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.carts.clear(user_id).await?;
    Ok(Json(cart.into()))
}

/// POST /cart/transfer: Merges a cart kept by the client before sign-in.
#[tracing::instrument(skip(state, req), fields(items = req.items.len()))]
pub async fn transfer<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Json(req): Json<TransferRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let items = req
        .items
        .into_iter()
        .map(|item| {
            Ok(GuestCartItem {
                product_id: product_id(&item.product_id)?,
                size: item.size,
                quantity: item.quantity.unwrap_or(1),
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let reconciled = state.carts.transfer_guest_cart(user_id, items).await?;
    Ok(Json(reconciled.into()))
}
