//! Catalog administration and browsing.

use chrono::Utc;
use common::{Page, PageRequest, ProductId, UserId};
use domain::{Brand, Money, Product, SizeStock};
use store::{ProductQuery, StorefrontStore};

use crate::access;
use crate::error::{Result, ServiceError};

const ADMIN_ONLY: &str = "You do not have permission to manage products";

/// Fields of a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub brand: Brand,
    pub description: String,
    pub price: Money,
    pub image: Option<String>,
    pub sizes: Vec<SizeStock>,
}

/// Partial update of a product. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub brand: Option<Brand>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub image: Option<Option<String>>,
    pub sizes: Option<Vec<SizeStock>>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct CatalogService<S> {
    store: S,
}

impl<S: StorefrontStore> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, acting_user: UserId, input: NewProduct) -> Result<Product> {
        access::require_admin(&self.store, acting_user, ADMIN_ONLY).await?;

        let mut product = Product::new(
            input.name.trim(),
            input.brand,
            input.price,
            input.sizes,
            Utc::now(),
        );
        product.description = input.description;
        product.image = input.image;
        product.validate()?;

        self.store.insert_product(&product).await?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_product(
        &self,
        acting_user: UserId,
        product_id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product> {
        access::require_admin(&self.store, acting_user, ADMIN_ONLY).await?;

        let mut product = self
            .store
            .find_product(product_id)
            .await?
            .ok_or_else(ServiceError::product_not_found)?;

        if let Some(name) = update.name {
            product.name = name.trim().to_string();
        }
        if let Some(brand) = update.brand {
            product.brand = brand;
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(image) = update.image {
            product.image = image;
        }
        if let Some(sizes) = update.sizes {
            product.sizes = sizes;
        }
        if let Some(is_active) = update.is_active {
            product.is_active = is_active;
        }
        product.validate()?;

        if !self.store.update_product(&product).await? {
            return Err(ServiceError::product_not_found());
        }
        product.updated_at = Some(Utc::now());
        Ok(product)
    }

    /// Soft delete: the product stays referenced by past orders.
    #[tracing::instrument(skip(self))]
    pub async fn deactivate_product(&self, acting_user: UserId, product_id: ProductId) -> Result<()> {
        access::require_admin(&self.store, acting_user, ADMIN_ONLY).await?;

        if !self.store.set_product_active(product_id, false).await? {
            return Err(ServiceError::product_not_found());
        }
        tracing::info!(%product_id, "product deactivated");
        Ok(())
    }

    /// Loads an active product.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product> {
        self.store
            .find_product(product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(ServiceError::product_not_found)
    }

    /// Lists active products by name.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, brand: Option<Brand>, page: PageRequest) -> Result<Page<Product>> {
        let mut query = ProductQuery::new().page(page);
        if let Some(brand) = brand {
            query = query.brand(brand);
        }
        Ok(self.store.list_products(&query).await?)
    }
}
