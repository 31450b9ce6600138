//! Account endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::UserId;
use domain::{Role, User};
use serde::{Deserialize, Serialize};
use services::{NewAccount, ProfileUpdate};
use store::StorefrontStore;

use super::{AppState, PageParams, PageResponse, parse_id};
use crate::auth::Caller;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

// -- Response types --

/// Public view of an account; never carries the password hash.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

// -- Handlers --

/// POST /users: Registers a new guest account.
#[tracing::instrument(skip(state, req))]
pub async fn register<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .users
        .register(NewAccount {
            email: req.email,
            password: req.password,
            display_name: req.display_name,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/me
#[tracing::instrument(skip(state))]
pub async fn me<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.get_profile(user_id).await?;
    Ok(Json(user.into()))
}

/// PATCH /users/me: Updates the caller's own profile.
#[tracing::instrument(skip(state, req))]
pub async fn update_me<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .update_profile(
            user_id,
            ProfileUpdate {
                display_name: req.display_name,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

/// GET /users: Paginated account list for admins.
#[tracing::instrument(skip(state))]
pub async fn list<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Query(params): Query<PageParams>,
) -> Result<Json<PageResponse<UserResponse>>, ApiError> {
    let users = state.users.list_users(user_id, params.to_request()).await?;
    Ok(Json(PageResponse::from_page(users, UserResponse::from)))
}

/// PATCH /users/{id}/role
#[tracing::instrument(skip(state, req))]
pub async fn set_role<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Caller(user_id): Caller,
    Path(id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let target: UserId = parse_id(&id, "user id")?;
    let user = state.users.set_role(user_id, target, &req.role).await?;
    Ok(Json(user.into()))
}
