//! Service error types.

use domain::{OrderError, ProductError};
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by storefront workflows.
///
/// Each variant carries the user-facing message.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A referenced user, product, order or cart does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Bad input, insufficient stock, empty cart or malformed status.
    #[error("{0}")]
    Invalid(String),

    /// Role or ownership violation.
    #[error("{0}")]
    Forbidden(String),

    /// The resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// Persistence failure.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the kind as a short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Invalid(_) => "invalid",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Internal(_) => "internal",
        }
    }

    pub(crate) fn user_not_found() -> Self {
        ServiceError::NotFound("User not found".to_string())
    }

    pub(crate) fn product_not_found() -> Self {
        ServiceError::NotFound("Product not found".to_string())
    }

    pub(crate) fn order_not_found() -> Self {
        ServiceError::NotFound("Order not found".to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => {
                ServiceError::Conflict(format!("Email already registered: {email}"))
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<ProductError> for ServiceError {
    fn from(err: ProductError) -> Self {
        ServiceError::Invalid(err.to_string())
    }
}

impl From<OrderError> for ServiceError {
    fn from(err: OrderError) -> Self {
        ServiceError::Invalid(err.to_string())
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_become_internal() {
        let err: ServiceError = StoreError::Unavailable("disk full".to_string()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert_eq!(err.kind(), "internal");
    }

    #[test]
    fn duplicate_email_becomes_conflict() {
        let err: ServiceError = StoreError::DuplicateEmail("a@b.c".to_string()).into();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn domain_errors_become_invalid() {
        let err: ServiceError = OrderError::EmptyCart.into();
        assert_eq!(err.to_string(), "Cannot create order from an empty cart");
        assert_eq!(err.kind(), "invalid");
    }
}
