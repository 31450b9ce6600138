//! Stock reservation and restoration with skip accounting.

use common::ProductId;
use domain::{OrderItem, StockAdjustment};
use store::{CatalogStore, StoreError};

use crate::error::ServiceError;

/// One line whose stock was actually decremented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedLine {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
}

/// Wraps the catalog's conditional stock primitives.
///
/// Missing products or sizes are no-ops; every skip is logged and counted in
/// `stock_adjustment_skipped_total`.
#[derive(Clone)]
pub struct StockKeeper<S> {
    store: S,
}

impl<S: CatalogStore> StockKeeper<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reserves a single line.
    pub async fn reserve(
        &self,
        product_id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<StockAdjustment, StoreError> {
        let outcome = self.store.reserve_stock(product_id, size, quantity).await?;
        record_skip("reserve", product_id, size, outcome);
        Ok(outcome)
    }

    /// Restores a single line.
    pub async fn restore(
        &self,
        product_id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<StockAdjustment, StoreError> {
        let outcome = self.store.restore_stock(product_id, size, quantity).await?;
        record_skip("restore", product_id, size, outcome);
        Ok(outcome)
    }

    /// Reserves every order line in order, appending each applied
    /// reservation to `ledger`.
    ///
    /// Stops at the first line that cannot be reserved. The ledger then holds
    /// exactly what must be compensated.
    #[tracing::instrument(skip(self, items, ledger), fields(lines = items.len()))]
    pub async fn reserve_all(
        &self,
        items: &[OrderItem],
        ledger: &mut Vec<ReservedLine>,
    ) -> Result<(), ServiceError> {
        for item in items {
            match self
                .reserve(item.product_id, &item.size, item.quantity)
                .await?
            {
                StockAdjustment::Applied { remaining } => {
                    tracing::debug!(
                        product_id = %item.product_id,
                        size = %item.size,
                        quantity = item.quantity,
                        remaining,
                        "stock reserved"
                    );
                    ledger.push(ReservedLine {
                        product_id: item.product_id,
                        size: item.size.clone(),
                        quantity: item.quantity,
                    });
                }
                StockAdjustment::Insufficient { available } => {
                    return Err(ServiceError::Invalid(format!(
                        "Cannot create order: {} (size {}): Not enough stock. Only {available} available.",
                        item.product_name, item.size
                    )));
                }
                StockAdjustment::ProductMissing | StockAdjustment::SizeMissing => {}
            }
        }
        Ok(())
    }

    /// Restores every reserved line. Never fails.
    ///
    /// A failed restoration is logged and counted, then the remaining lines
    /// are still attempted. Returns the number of lines restored.
    #[tracing::instrument(skip(self, ledger), fields(lines = ledger.len()))]
    pub async fn restore_all(&self, ledger: &[ReservedLine]) -> usize {
        let mut restored = 0;
        for line in ledger {
            match self.restore(line.product_id, &line.size, line.quantity).await {
                Ok(outcome) if outcome.is_applied() => restored += 1,
                Ok(_) => {}
                Err(e) => {
                    metrics::counter!("stock_restore_failures_total").increment(1);
                    tracing::error!(
                        product_id = %line.product_id,
                        size = %line.size,
                        quantity = line.quantity,
                        error = %e,
                        "failed to restore reserved stock"
                    );
                }
            }
        }
        restored
    }
}

fn record_skip(operation: &'static str, product_id: ProductId, size: &str, outcome: StockAdjustment) {
    if outcome.is_skipped() {
        metrics::counter!(
            "stock_adjustment_skipped_total",
            "operation" => operation,
            "reason" => outcome.as_str()
        )
        .increment(1);
        tracing::warn!(
            %product_id,
            size,
            operation,
            reason = outcome.as_str(),
            "stock adjustment skipped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{Brand, Money, Product, SizeStock};
    use store::InMemoryStore;

    fn line(product: &Product, size: &str, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: product.id,
            size: size.to_string(),
            quantity,
            price: product.price,
            product_name: product.name.clone(),
            created_at: Utc::now(),
        }
    }

    async fn seeded() -> (InMemoryStore, Product) {
        let store = InMemoryStore::new();
        let product = Product::new(
            "Ultraboost",
            Brand::Adidas,
            Money::from_dollars(180),
            vec![SizeStock::new("40", 2), SizeStock::new("41", 1)],
            Utc::now(),
        );
        store.insert_product(&product).await.unwrap();
        (store, product)
    }

    #[tokio::test]
    async fn reserve_all_stops_at_first_insufficient_line() {
        let (store, product) = seeded().await;
        let keeper = StockKeeper::new(store.clone());
        let items = vec![line(&product, "40", 2), line(&product, "41", 5)];

        let mut ledger = Vec::new();
        let result = keeper.reserve_all(&items, &mut ledger).await;

        assert!(matches!(result, Err(ServiceError::Invalid(_))));
        assert_eq!(ledger.len(), 1);
        assert_eq!(store.stock_of(product.id, "40").await, Some(0));
        assert_eq!(store.stock_of(product.id, "41").await, Some(1));

        assert_eq!(keeper.restore_all(&ledger).await, 1);
        assert_eq!(store.stock_of(product.id, "40").await, Some(2));
    }

    #[tokio::test]
    async fn missing_lines_are_skipped_not_ledgered() {
        let (store, product) = seeded().await;
        let keeper = StockKeeper::new(store.clone());
        let items = vec![line(&product, "47", 1), line(&product, "40", 1)];

        let mut ledger = Vec::new();
        keeper.reserve_all(&items, &mut ledger).await.unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].size, "40");
    }

    #[tokio::test]
    async fn restore_failures_are_swallowed() {
        let (store, product) = seeded().await;
        let keeper = StockKeeper::new(store.clone());
        let mut ledger = Vec::new();
        keeper
            .reserve_all(&[line(&product, "40", 1)], &mut ledger)
            .await
            .unwrap();

        store.fail_stock_restores(true).await;
        assert_eq!(keeper.restore_all(&ledger).await, 0);
        assert_eq!(store.stock_of(product.id, "40").await, Some(1));
    }
}
