//! Persistence layer for the storefront.
//!
//! Each aggregate gets its own async trait (`CatalogStore`, `UserStore`,
//! `CartStore`, `OrderStore`). Both backends implement all four on a single
//! type so services can be generic over one `StorefrontStore` parameter.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::{OrderQuery, ProductQuery};
pub use store::{CartStore, CatalogStore, OrderStore, StorefrontStore, UserStore};
