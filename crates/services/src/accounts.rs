//! Account registration and role administration.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use chrono::Utc;
use common::{Page, PageRequest, UserId};
use domain::{Role, User};
use rand_core::OsRng;
use store::StorefrontStore;

use crate::access;
use crate::error::{Result, ServiceError};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Longest accepted display name, in characters.
pub const MAX_DISPLAY_NAME_LEN: usize = 100;

/// Registration input.
#[derive(Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Self-service profile changes. Absent fields stay unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
}

#[derive(Clone)]
pub struct UserService<S> {
    store: S,
}

impl<S: StorefrontStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers an active guest account.
    ///
    /// The e-mail is stored lowercase and must be unused.
    #[tracing::instrument(skip(self, input))]
    pub async fn register(&self, input: NewAccount) -> Result<User> {
        let email = input.email.trim().to_lowercase();
        let Some((local, host)) = email.split_once('@') else {
            return Err(ServiceError::Invalid("Invalid email address".to_string()));
        };
        if local.is_empty() || host.is_empty() {
            return Err(ServiceError::Invalid("Invalid email address".to_string()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::Invalid(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let display_name = input
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| local.to_string());

        let hash = hash_password(&input.password)?;
        let user = User::new(email.clone(), display_name, hash, Utc::now());
        self.store.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_profile(&self, user_id: UserId) -> Result<User> {
        access::load_user(&self.store, user_id).await
    }

    /// Applies a profile update to the caller's own account.
    ///
    /// The display name is trimmed and must be non-empty. An update with no
    /// fields returns the profile unchanged.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> Result<User> {
        let Some(display_name) = update.display_name else {
            return access::load_user(&self.store, user_id).await;
        };

        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ServiceError::Invalid(
                "Display name must not be empty".to_string(),
            ));
        }
        if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(ServiceError::Invalid(format!(
                "Display name must be at most {MAX_DISPLAY_NAME_LEN} characters"
            )));
        }

        let user = self
            .store
            .set_display_name(user_id, display_name)
            .await?
            .ok_or_else(ServiceError::user_not_found)?;
        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    /// Lists accounts. Admin only.
    #[tracing::instrument(skip(self))]
    pub async fn list_users(&self, acting_user: UserId, page: PageRequest) -> Result<Page<User>> {
        access::require_admin(
            &self.store,
            acting_user,
            "You do not have permission to list users",
        )
        .await?;
        Ok(self.store.list_users(page).await?)
    }

    /// Sets the role of an account. Admin only.
    #[tracing::instrument(skip(self))]
    pub async fn set_role(&self, acting_user: UserId, target: UserId, role: &str) -> Result<User> {
        let role: Role = role
            .parse()
            .map_err(|e: domain::UnknownRole| ServiceError::Invalid(e.to_string()))?;

        access::require_admin(
            &self.store,
            acting_user,
            "You do not have permission to change roles",
        )
        .await?;

        if !self.store.set_role(target, role).await? {
            return Err(ServiceError::user_not_found());
        }
        tracing::info!(user_id = %target, %role, "role changed");
        access::load_user(&self.store, target).await
    }

    /// Makes sure an admin account exists for `email`, registering it when
    /// missing. An existing account keeps its password.
    #[tracing::instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<User> {
        let normalized = email.trim().to_lowercase();
        let user = match self.store.find_user_by_email(&normalized).await? {
            Some(user) => user,
            None => {
                self.register(NewAccount {
                    email: normalized,
                    password: password.to_string(),
                    display_name: None,
                })
                .await?
            }
        };

        if user.is_admin() {
            return Ok(user);
        }
        if !self.store.set_role(user.id, Role::Admin).await? {
            return Err(ServiceError::user_not_found());
        }
        tracing::info!(user_id = %user.id, "admin account ensured");
        access::load_user(&self.store, user.id).await
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            ServiceError::Internal(format!("Password hashing failed: {e}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use store::{InMemoryStore, UserStore};

    fn account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password: "correct horse".to_string(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn register_normalizes_and_hashes() {
        let service = UserService::new(InMemoryStore::new());

        let user = service.register(account("  Jane@Example.COM ")).await.unwrap();

        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.display_name, "jane");
        assert_eq!(user.role, Role::Guest);
        assert!(user.is_active);
        assert_ne!(user.password_hash, "correct horse");

        let parsed = PasswordHash::new(&user.password_hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"correct horse", &parsed)
                .is_ok()
        );
    }

    #[tokio::test]
    async fn register_rejects_duplicates_and_short_passwords() {
        let service = UserService::new(InMemoryStore::new());
        service.register(account("dup@example.com")).await.unwrap();

        assert!(matches!(
            service.register(account("DUP@example.com")).await,
            Err(ServiceError::Conflict(_))
        ));

        let mut short = account("short@example.com");
        short.password = "1234567".to_string();
        assert!(matches!(
            service.register(short).await,
            Err(ServiceError::Invalid(_))
        ));

        assert!(matches!(
            service.register(account("not-an-email")).await,
            Err(ServiceError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn update_profile_trims_and_validates_display_name() {
        let service = UserService::new(InMemoryStore::new());
        let user = service.register(account("sam@example.com")).await.unwrap();

        let renamed = service
            .update_profile(
                user.id,
                ProfileUpdate {
                    display_name: Some("  Sam Runner ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.display_name, "Sam Runner");
        assert_eq!(renamed.email, "sam@example.com");
        assert!(renamed.updated_at.is_some());

        let unchanged = service
            .update_profile(user.id, ProfileUpdate::default())
            .await
            .unwrap();
        assert_eq!(unchanged.display_name, "Sam Runner");

        let blank = ProfileUpdate {
            display_name: Some("   ".to_string()),
        };
        assert!(matches!(
            service.update_profile(user.id, blank).await,
            Err(ServiceError::Invalid(_))
        ));

        let long = ProfileUpdate {
            display_name: Some("x".repeat(MAX_DISPLAY_NAME_LEN + 1)),
        };
        assert!(matches!(
            service.update_profile(user.id, long).await,
            Err(ServiceError::Invalid(_))
        ));

        let rename = ProfileUpdate {
            display_name: Some("Ghost".to_string()),
        };
        assert!(matches!(
            service.update_profile(UserId::new(), rename).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn set_role_is_admin_only() {
        let store = InMemoryStore::new();
        let service = UserService::new(store.clone());
        let mut admin = User::new("root@example.com", "Root", "hash", Utc::now());
        admin.role = Role::Admin;
        store.insert_user(&admin).await.unwrap();
        let user = service.register(account("member@example.com")).await.unwrap();

        assert!(matches!(
            service.set_role(user.id, user.id, "admin").await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.set_role(admin.id, user.id, "root").await,
            Err(ServiceError::Invalid(_))
        ));

        let promoted = service.set_role(admin.id, user.id, "customer").await.unwrap();
        assert_eq!(promoted.role, Role::Customer);

        let page = service
            .list_users(admin.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn ensure_admin_registers_or_promotes() {
        let service = UserService::new(InMemoryStore::new());

        let created = service
            .ensure_admin("Ops@Example.com", "bootstrap-pass")
            .await
            .unwrap();
        assert_eq!(created.email, "ops@example.com");
        assert_eq!(created.role, Role::Admin);

        let again = service
            .ensure_admin("ops@example.com", "ignored-pass")
            .await
            .unwrap();
        assert_eq!(again.id, created.id);

        let member = service.register(account("member@example.com")).await.unwrap();
        let promoted = service
            .ensure_admin("member@example.com", "whatever1")
            .await
            .unwrap();
        assert_eq!(promoted.id, member.id);
        assert_eq!(promoted.role, Role::Admin);
    }
}
