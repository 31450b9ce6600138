//! Caller lookups shared by the services.

use common::UserId;
use domain::User;
use store::UserStore;

use crate::error::{Result, ServiceError};

/// Loads a user, failing with `NotFound` if absent.
pub(crate) async fn load_user<S: UserStore>(store: &S, user_id: UserId) -> Result<User> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(ServiceError::user_not_found)
}

/// Loads a user that is allowed to shop.
pub(crate) async fn load_shopper<S: UserStore>(store: &S, user_id: UserId) -> Result<User> {
    let user = load_user(store, user_id).await?;
    if !user.is_active {
        return Err(ServiceError::Forbidden("Account is disabled".to_string()));
    }
    Ok(user)
}

/// Loads the acting user and requires the admin role.
///
/// An unknown acting user is refused with the same message.
pub(crate) async fn require_admin<S: UserStore>(
    store: &S,
    acting_user: UserId,
    message: &str,
) -> Result<User> {
    match store.find_user(acting_user).await? {
        Some(user) if user.is_admin() => Ok(user),
        _ => Err(ServiceError::Forbidden(message.to_string())),
    }
}
