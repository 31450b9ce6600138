//! Shared types used by every storefront crate.

pub mod ids;
pub mod page;

pub use ids::{OrderId, ProductId, UserId};
pub use page::{Page, PageRequest};
