//! Storefront workflows on top of the store traits.
//!
//! The checkout coordinator is the core: it turns a cart into an order in
//! these steps:
//! 1. Validate the buyer, address, cart and stock
//! 2. Reserve stock line by line
//! 3. Persist the order
//! 4. Promote a first-time buyer to customer
//!
//! If step 2 or 3 fails, the reserved stock is restored before the error is
//! returned. Step 4 is best effort.

mod access;
pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod orders;
pub mod state;
pub mod stock;

pub use accounts::{NewAccount, ProfileUpdate, UserService};
pub use cart::{CartService, GuestCartItem, ReconciledCart};
pub use catalog::{CatalogService, NewProduct, ProductUpdate};
pub use checkout::{CheckoutCoordinator, CheckoutOutcome};
pub use error::{Result, ServiceError};
pub use orders::OrderService;
pub use state::CheckoutStage;
pub use stock::{ReservedLine, StockKeeper};
