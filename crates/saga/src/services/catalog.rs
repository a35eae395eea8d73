//! Catalog/inventory service trait and in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{BearerToken, Money, ProductId};

use crate::error::UpstreamError;

/// Trait for the catalog service the saga prices and reserves against.
///
/// All calls carry the caller's bearer credential; the catalog owns
/// credential validation.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetches the current retail price of a product. Idempotent.
    async fn fetch_price(
        &self,
        product_id: &ProductId,
        credential: &BearerToken,
    ) -> Result<Money, UpstreamError>;

    /// Places a temporary hold on `quantity` units of a product.
    async fn reserve_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        credential: &BearerToken,
    ) -> Result<(), UpstreamError>;

    /// Converts a prior hold into a committed deduction.
    async fn commit_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        credential: &BearerToken,
    ) -> Result<(), UpstreamError>;

    /// Releases a prior hold without deducting stock.
    async fn release_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        credential: &BearerToken,
    ) -> Result<(), UpstreamError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    prices: HashMap<ProductId, Money>,
    reserved: HashMap<ProductId, u32>,
    committed: HashMap<ProductId, u32>,
    fail_price: HashSet<ProductId>,
    fail_reserve: HashSet<ProductId>,
    fail_commit: HashSet<ProductId>,
    fail_release: HashSet<ProductId>,
    price_calls: u32,
    reserve_calls: u32,
    commit_calls: u32,
    release_calls: u32,
    last_credential: Option<String>,
}

/// In-memory catalog service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogService {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogService {
    /// Creates a new in-memory catalog service with no products.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retail price of a product.
    pub fn set_price(&self, product_id: impl Into<ProductId>, price: Money) {
        self.state
            .write()
            .unwrap()
            .prices
            .insert(product_id.into(), price);
    }

    /// Configures price fetches for this product to fail.
    pub fn set_fail_on_price(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .unwrap()
            .fail_price
            .insert(product_id.into());
    }

    /// Configures reservations for this product to fail.
    pub fn set_fail_on_reserve(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .unwrap()
            .fail_reserve
            .insert(product_id.into());
    }

    /// Configures commits for this product to fail.
    pub fn set_fail_on_commit(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .unwrap()
            .fail_commit
            .insert(product_id.into());
    }

    /// Configures releases for this product to fail.
    pub fn set_fail_on_release(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .unwrap()
            .fail_release
            .insert(product_id.into());
    }

    /// Units currently held in reservation for a product.
    pub fn reserved_quantity(&self, product_id: &ProductId) -> u32 {
        self.state
            .read()
            .unwrap()
            .reserved
            .get(product_id)
            .copied()
            .unwrap_or(0)
    }

    /// Units durably deducted for a product.
    pub fn committed_quantity(&self, product_id: &ProductId) -> u32 {
        self.state
            .read()
            .unwrap()
            .committed
            .get(product_id)
            .copied()
            .unwrap_or(0)
    }

    /// Number of price fetches made.
    pub fn price_calls(&self) -> u32 {
        self.state.read().unwrap().price_calls
    }

    /// Number of reserve calls made.
    pub fn reserve_calls(&self) -> u32 {
        self.state.read().unwrap().reserve_calls
    }

    /// Number of commit calls made.
    pub fn commit_calls(&self) -> u32 {
        self.state.read().unwrap().commit_calls
    }

    /// Number of release calls made.
    pub fn release_calls(&self) -> u32 {
        self.state.read().unwrap().release_calls
    }

    /// Total calls of any kind made against the catalog.
    pub fn total_calls(&self) -> u32 {
        let state = self.state.read().unwrap();
        state.price_calls + state.reserve_calls + state.commit_calls + state.release_calls
    }

    /// The bare credential seen on the most recent call.
    pub fn last_credential(&self) -> Option<String> {
        self.state.read().unwrap().last_credential.clone()
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn fetch_price(
        &self,
        product_id: &ProductId,
        credential: &BearerToken,
    ) -> Result<Money, UpstreamError> {
        let mut state = self.state.write().unwrap();
        state.price_calls += 1;
        state.last_credential = Some(credential.as_str().to_string());

        if state.fail_price.contains(product_id) {
            return Err(UpstreamError::unavailable("catalog timed out"));
        }

        state
            .prices
            .get(product_id)
            .copied()
            .ok_or_else(|| UpstreamError::rejected(404, format!("unknown product {product_id}")))
    }

    async fn reserve_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        credential: &BearerToken,
    ) -> Result<(), UpstreamError> {
        let mut state = self.state.write().unwrap();
        state.reserve_calls += 1;
        state.last_credential = Some(credential.as_str().to_string());

        if state.fail_reserve.contains(product_id) {
            return Err(UpstreamError::rejected(
                409,
                format!("insufficient stock for {product_id}"),
            ));
        }

        *state.reserved.entry(product_id.clone()).or_insert(0) += quantity;
        Ok(())
    }

    async fn commit_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        credential: &BearerToken,
    ) -> Result<(), UpstreamError> {
        let mut state = self.state.write().unwrap();
        state.commit_calls += 1;
        state.last_credential = Some(credential.as_str().to_string());

        if state.fail_commit.contains(product_id) {
            return Err(UpstreamError::rejected(
                409,
                format!("commit rejected for {product_id}"),
            ));
        }

        let held = state.reserved.get(product_id).copied().unwrap_or(0);
        if held < quantity {
            return Err(UpstreamError::rejected(
                409,
                format!("no matching reservation for {product_id}"),
            ));
        }

        if held == quantity {
            state.reserved.remove(product_id);
        } else {
            state.reserved.insert(product_id.clone(), held - quantity);
        }
        *state.committed.entry(product_id.clone()).or_insert(0) += quantity;
        Ok(())
    }

    async fn release_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        credential: &BearerToken,
    ) -> Result<(), UpstreamError> {
        let mut state = self.state.write().unwrap();
        state.release_calls += 1;
        state.last_credential = Some(credential.as_str().to_string());

        if state.fail_release.contains(product_id) {
            return Err(UpstreamError::unavailable(format!(
                "release failed for {product_id}"
            )));
        }

        let held = state.reserved.get(product_id).copied().unwrap_or(0);
        let remaining = held.saturating_sub(quantity);
        if remaining == 0 {
            state.reserved.remove(product_id);
        } else {
            state.reserved.insert(product_id.clone(), remaining);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn token() -> BearerToken {
        BearerToken::new("test-token")
    }

    #[tokio::test]
    async fn test_price_fetch_is_idempotent() {
        let catalog = InMemoryCatalogService::new();
        catalog.set_price("PRD-001", Money::new(dec!(150000)));

        let first = catalog
            .fetch_price(&ProductId::new("PRD-001"), &token())
            .await
            .unwrap();
        let second = catalog
            .fetch_price(&ProductId::new("PRD-001"), &token())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(catalog.price_calls(), 2);
        assert_eq!(catalog.reserved_quantity(&ProductId::new("PRD-001")), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_is_rejected() {
        let catalog = InMemoryCatalogService::new();
        let result = catalog
            .fetch_price(&ProductId::new("PRD-404"), &token())
            .await;
        assert!(matches!(
            result,
            Err(UpstreamError::Rejected { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_reserve_commit_lifecycle() {
        let catalog = InMemoryCatalogService::new();
        let product = ProductId::new("PRD-001");

        catalog.reserve_stock(&product, 3, &token()).await.unwrap();
        assert_eq!(catalog.reserved_quantity(&product), 3);

        catalog.commit_stock(&product, 3, &token()).await.unwrap();
        assert_eq!(catalog.reserved_quantity(&product), 0);
        assert_eq!(catalog.committed_quantity(&product), 3);
    }

    #[tokio::test]
    async fn test_commit_without_reservation_is_rejected() {
        let catalog = InMemoryCatalogService::new();
        let result = catalog
            .commit_stock(&ProductId::new("PRD-001"), 1, &token())
            .await;
        assert!(matches!(
            result,
            Err(UpstreamError::Rejected { status: 409, .. })
        ));
    }

    #[tokio::test]
    async fn test_release_drops_the_hold() {
        let catalog = InMemoryCatalogService::new();
        let product = ProductId::new("PRD-001");

        catalog.reserve_stock(&product, 5, &token()).await.unwrap();
        catalog.release_stock(&product, 5, &token()).await.unwrap();

        assert_eq!(catalog.reserved_quantity(&product), 0);
        assert_eq!(catalog.committed_quantity(&product), 0);
    }

    #[tokio::test]
    async fn test_fail_on_reserve() {
        let catalog = InMemoryCatalogService::new();
        catalog.set_fail_on_reserve("PRD-001");

        let result = catalog
            .reserve_stock(&ProductId::new("PRD-001"), 1, &token())
            .await;
        assert!(matches!(
            result,
            Err(UpstreamError::Rejected { status: 409, .. })
        ));
        assert_eq!(catalog.reserved_quantity(&ProductId::new("PRD-001")), 0);
    }

    #[tokio::test]
    async fn test_credential_is_recorded() {
        let catalog = InMemoryCatalogService::new();
        catalog.set_price("PRD-001", Money::new(dec!(10)));

        catalog
            .fetch_price(&ProductId::new("PRD-001"), &BearerToken::new("abc123"))
            .await
            .unwrap();

        assert_eq!(catalog.last_credential(), Some("abc123".to_string()));
    }
}
