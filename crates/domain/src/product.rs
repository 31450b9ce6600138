//! Catalog products and per-size stock.

use chrono::{DateTime, Utc};
use common::ProductId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

/// Errors raised by product validation and stock checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    /// The product has been soft deleted.
    #[error("Product is not available")]
    Unavailable,

    /// The product does not offer the requested size.
    #[error("Size {size} not available for this product")]
    SizeUnavailable { size: String },

    /// The requested quantity exceeds the stock of the size.
    #[error("Not enough stock. Only {available} available.")]
    InsufficientStock { available: u32, requested: u32 },

    /// Product name is empty, too short or too long.
    #[error("Product name must be between 2 and 100 characters")]
    InvalidName,

    /// Price must be strictly positive.
    #[error("Price must be greater than zero")]
    InvalidPrice,

    /// Price above the catalog ceiling.
    #[error("Price must not exceed {}", Product::MAX_PRICE)]
    PriceTooHigh,

    /// Two size entries share the same label.
    #[error("Duplicate size: {0}")]
    DuplicateSize(String),

    /// Brand outside the supported set.
    #[error("Unknown brand: {0}")]
    UnknownBrand(String),
}

/// Brands carried by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Brand {
    Nike,
    Adidas,
    Vans,
}

impl Brand {
    /// Returns the brand name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Nike => "Nike",
            Brand::Adidas => "Adidas",
            Brand::Vans => "Vans",
        }
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Brand {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Nike" => Ok(Brand::Nike),
            "Adidas" => Ok(Brand::Adidas),
            "Vans" => Ok(Brand::Vans),
            other => Err(ProductError::UnknownBrand(other.to_string())),
        }
    }
}

/// Stock count of a single size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStock {
    pub size: String,
    pub stock: u32,
}

impl SizeStock {
    pub fn new(size: impl Into<String>, stock: u32) -> Self {
        Self {
            size: size.into(),
            stock,
        }
    }
}

/// Outcome of a stock reservation or restoration against one size entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    /// Stock was changed; `remaining` is the new count.
    Applied { remaining: u32 },
    /// Reservation refused because the size holds fewer units than requested.
    Insufficient { available: u32 },
    /// The product no longer exists. Treated as a no-op.
    ProductMissing,
    /// The product exists but no longer offers the size. Treated as a no-op.
    SizeMissing,
}

impl StockAdjustment {
    /// Returns true if stock was actually changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, StockAdjustment::Applied { .. })
    }

    /// Returns true for the silent no-op outcomes.
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            StockAdjustment::ProductMissing | StockAdjustment::SizeMissing
        )
    }

    /// Label used in logs and metric tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            StockAdjustment::Applied { .. } => "applied",
            StockAdjustment::Insufficient { .. } => "insufficient",
            StockAdjustment::ProductMissing => "product_missing",
            StockAdjustment::SizeMissing => "size_missing",
        }
    }
}

/// A catalog product.
///
/// Products are never physically deleted; deletion clears `is_active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: Brand,
    pub description: String,
    pub price: Money,
    pub image: Option<String>,
    pub is_active: bool,
    /// Ordered size list; labels are unique within a product.
    pub sizes: Vec<SizeStock>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Highest accepted unit price, $1,000,000.00.
    pub const MAX_PRICE: Money = Money::from_cents(100_000_000);

    /// Creates a new active product.
    pub fn new(
        name: impl Into<String>,
        brand: Brand,
        price: Money,
        sizes: Vec<SizeStock>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            brand,
            description: String::new(),
            price,
            image: None,
            is_active: true,
            sizes,
            created_at: now,
            updated_at: None,
        }
    }

    /// Checks the editable fields.
    pub fn validate(&self) -> Result<(), ProductError> {
        let name = self.name.trim();
        if name.len() != self.name.len() || !(2..=100).contains(&name.chars().count()) {
            return Err(ProductError::InvalidName);
        }
        if !self.price.is_positive() {
            return Err(ProductError::InvalidPrice);
        }
        if self.price > Self::MAX_PRICE {
            return Err(ProductError::PriceTooHigh);
        }
        for (i, entry) in self.sizes.iter().enumerate() {
            if self.sizes[..i].iter().any(|s| s.size == entry.size) {
                return Err(ProductError::DuplicateSize(entry.size.clone()));
            }
        }
        Ok(())
    }

    /// Looks up a size entry by exact label.
    pub fn size(&self, size: &str) -> Option<&SizeStock> {
        self.sizes.iter().find(|s| s.size == size)
    }

    fn size_mut(&mut self, size: &str) -> Option<&mut SizeStock> {
        self.sizes.iter_mut().find(|s| s.size == size)
    }

    /// Checks that `quantity` units of `size` can be sold right now.
    ///
    /// Returns the current stock of the size on success.
    pub fn check_availability(&self, size: &str, quantity: u32) -> Result<u32, ProductError> {
        if !self.is_active {
            return Err(ProductError::Unavailable);
        }
        let entry = self
            .size(size)
            .ok_or_else(|| ProductError::SizeUnavailable {
                size: size.to_string(),
            })?;
        if entry.stock < quantity {
            return Err(ProductError::InsufficientStock {
                available: entry.stock,
                requested: quantity,
            });
        }
        Ok(entry.stock)
    }

    /// Decrements the stock of `size` only if it holds at least `quantity` units.
    pub fn reserve(&mut self, size: &str, quantity: u32, now: DateTime<Utc>) -> StockAdjustment {
        let Some(entry) = self.size_mut(size) else {
            return StockAdjustment::SizeMissing;
        };
        if entry.stock < quantity {
            return StockAdjustment::Insufficient {
                available: entry.stock,
            };
        }
        entry.stock -= quantity;
        let remaining = entry.stock;
        self.updated_at = Some(now);
        StockAdjustment::Applied { remaining }
    }

    /// Increments the stock of `size` by `quantity`, unbounded.
    pub fn restore(&mut self, size: &str, quantity: u32, now: DateTime<Utc>) -> StockAdjustment {
        let Some(entry) = self.size_mut(size) else {
            return StockAdjustment::SizeMissing;
        };
        entry.stock = entry.stock.saturating_add(quantity);
        let remaining = entry.stock;
        self.updated_at = Some(now);
        StockAdjustment::Applied { remaining }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sneaker() -> Product {
        Product::new(
            "Air Max",
            Brand::Nike,
            Money::from_dollars(100),
            vec![SizeStock::new("40", 5), SizeStock::new("41", 0)],
            Utc::now(),
        )
    }

    #[test]
    fn availability_checks_active_flag_size_and_stock() {
        let mut product = sneaker();
        assert_eq!(product.check_availability("40", 5), Ok(5));
        assert_eq!(
            product.check_availability("41", 1),
            Err(ProductError::InsufficientStock {
                available: 0,
                requested: 1
            })
        );
        assert!(matches!(
            product.check_availability("44", 1),
            Err(ProductError::SizeUnavailable { .. })
        ));

        product.is_active = false;
        assert_eq!(
            product.check_availability("40", 1),
            Err(ProductError::Unavailable)
        );
    }

    #[test]
    fn reserve_is_conditional() {
        let mut product = sneaker();
        let now = Utc::now();

        assert_eq!(
            product.reserve("40", 3, now),
            StockAdjustment::Applied { remaining: 2 }
        );
        assert_eq!(
            product.reserve("40", 3, now),
            StockAdjustment::Insufficient { available: 2 }
        );
        assert_eq!(product.size("40").unwrap().stock, 2);
        assert_eq!(product.reserve("39", 1, now), StockAdjustment::SizeMissing);
    }

    #[test]
    fn restore_is_unbounded() {
        let mut product = sneaker();
        assert_eq!(
            product.restore("40", 10, Utc::now()),
            StockAdjustment::Applied { remaining: 15 }
        );
        assert!(product.updated_at.is_some());
    }

    #[test]
    fn validate_rejects_bad_fields() {
        let mut product = sneaker();
        assert!(product.validate().is_ok());

        product.sizes.push(SizeStock::new("40", 1));
        assert_eq!(
            product.validate(),
            Err(ProductError::DuplicateSize("40".to_string()))
        );

        let mut product = sneaker();
        product.price = Money::zero();
        assert_eq!(product.validate(), Err(ProductError::InvalidPrice));

        let mut product = sneaker();
        product.price = Product::MAX_PRICE;
        assert!(product.validate().is_ok());
        product.price = Money::from_cents(Product::MAX_PRICE.cents() + 1);
        assert_eq!(product.validate(), Err(ProductError::PriceTooHigh));
        assert_eq!(
            ProductError::PriceTooHigh.to_string(),
            "Price must not exceed $1000000.00"
        );

        let mut product = sneaker();
        product.name = " X".to_string();
        assert_eq!(product.validate(), Err(ProductError::InvalidName));
    }

    #[test]
    fn brand_parses_known_names_only() {
        assert_eq!("Vans".parse::<Brand>(), Ok(Brand::Vans));
        assert!("Puma".parse::<Brand>().is_err());
    }
}
