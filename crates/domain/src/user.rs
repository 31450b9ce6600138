//! User accounts and roles.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role string outside `guest`, `customer`, `admin`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Access role of an account.
///
/// ```text
/// Guest ──(first checkout)──► Customer
/// any ──(admin)──► any
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Registered but has never placed an order.
    #[default]
    Guest,
    /// Has placed at least one order.
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Role::Guest),
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Lowercased, unique across accounts.
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new active guest account.
    pub fn new(
        email: impl Into<String>,
        display_name: impl Into<String>,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            display_name: display_name.into(),
            password_hash: password_hash.into(),
            role: Role::Guest,
            is_active: true,
            created_at: now,
            updated_at: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Role this account should move to after a successful checkout, if any.
    pub fn role_after_checkout(&self) -> Option<Role> {
        match self.role {
            Role::Guest => Some(Role::Customer),
            Role::Customer | Role::Admin => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_users_are_active_guests() {
        let user = User::new("a@example.com", "a", "hash", Utc::now());
        assert_eq!(user.role, Role::Guest);
        assert!(user.is_active);
        assert!(!user.is_admin());
    }

    #[test]
    fn only_guests_are_promoted_after_checkout() {
        let mut user = User::new("a@example.com", "a", "hash", Utc::now());
        assert_eq!(user.role_after_checkout(), Some(Role::Customer));

        user.role = Role::Customer;
        assert_eq!(user.role_after_checkout(), None);

        user.role = Role::Admin;
        assert_eq!(user.role_after_checkout(), None);
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Guest, Role::Customer, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert_eq!(
            "owner".parse::<Role>(),
            Err(UnknownRole("owner".to_string()))
        );
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
