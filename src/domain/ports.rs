use crate::domain::errors::MarketDataError;
use crate::domain::market::ReferencePrices;
use async_trait::async_trait;

// Need async_trait for async functions in traits
#[async_trait]
pub trait MarketPriceSource: Send + Sync {
    /// Collects a fresh reference price table.
    async fn fetch_prices(&self) -> Result<ReferencePrices, MarketDataError>;

    fn name(&self) -> &str;
}
