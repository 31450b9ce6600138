//! Catalog endpoints. Browsing is public, mutations need an admin caller.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{PageRequest, ProductId};
use domain::{Brand, Money, Product, SizeStock};
use serde::{Deserialize, Serialize};
use services::{NewProduct, ProductUpdate};
use store::StorefrontStore;

use super::{AppState, PageResponse, parse_id};
use crate::auth::Caller;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub brand: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    pub image: Option<String>,
    #[serde(default)]
    pub sizes: Vec<SizeStock>,
}

/// Absent fields stay unchanged; `"image": null` clears the image.
#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
    pub sizes: Option<Vec<SizeStock>>,
    pub is_active: Option<bool>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub brand: Brand,
    pub description: String,
    pub price_cents: i64,
    pub image: Option<String>,
    pub sizes: Vec<SizeStock>,
    pub in_stock: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            in_stock: product.sizes.iter().any(|s| s.stock > 0),
            name: product.name,
            brand: product.brand,
            description: product.description,
            price_cents: product.price.cents(),
            image: product.image,
            sizes: product.sizes,
            is_active: product.is_active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

fn parse_brand(raw: &str) -> Result<Brand, ApiError> {
    raw.parse()
        .map_err(|e: domain::ProductError| ApiError::BadRequest(e.to_string()))
}

fn product_id(raw: &str) -> Result<ProductId, ApiError> {
    parse_id(raw, "product id")
}

// -- Handlers --

/// GET /products: Active products, optionally filtered by brand.
#[tracing::instrument(skip(state))]
pub async fn list<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResponse<ProductResponse>>, ApiError> {
    let brand = params
        .brand
        .as_deref()
        .filter(|b| !b.is_empty())
        .map(parse_brand)
        .transpose()?;
    let page = PageRequest::new(
        params.page.unwrap_or(1),
        params.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
    );
    let products = state.catalog.list_products(brand, page).await?;
    Ok(Json(PageResponse::from_page(products, ProductResponse::from)))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.get_product(product_id(&id)?).await?;
    Ok(Json(product.into()))
}

/// POST /products
#[tracing::instrument(skip(state, req))]
pub async fn create<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let input = NewProduct {
        brand: parse_brand(&req.brand)?,
        name: req.name,
        description: req.description,
        price: Money::from_cents(req.price_cents),
        image: req.image,
        sizes: req.sizes,
    };

    let product = state.catalog.create_product(user_id, input).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /products/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let update = ProductUpdate {
        brand: req.brand.as_deref().map(parse_brand).transpose()?,
        name: req.name,
        description: req.description,
        price: req.price_cents.map(Money::from_cents),
        image: req.image,
        sizes: req.sizes,
        is_active: req.is_active,
    };

    let product = state
        .catalog
        .update_product(user_id, product_id(&id)?, update)
        .await?;
    Ok(Json(product.into()))
}

/// DELETE /products/{id}: Deactivates the product.
#[tracing::instrument(skip(state))]
pub async fn deactivate<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .catalog
        .deactivate_product(user_id, product_id(&id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
