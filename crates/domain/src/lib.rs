//! Domain layer for the storefront.
//!
//! This crate holds the data model and the invariants that do not need I/O:
//! - `Money` arithmetic in cents
//! - Products with per-size stock and the conditional stock adjustments
//! - User accounts and roles
//! - Carts with one line per `(product, size)` and price snapshots
//! - Orders snapshotted from carts, with a permissive status enum

pub mod cart;
pub mod money;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem, InvalidCartItem, InvalidItemReason};
pub use common::{OrderId, ProductId, UserId};
pub use money::Money;
pub use order::{Order, OrderError, OrderItem, OrderStatus};
pub use product::{Brand, Product, ProductError, SizeStock, StockAdjustment};
pub use user::{Role, UnknownRole, User};
