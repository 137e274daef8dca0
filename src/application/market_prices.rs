use crate::domain::errors::MarketDataError;
use crate::domain::market::ReferencePrices;
use crate::domain::ports::MarketPriceSource;
use std::sync::{Arc, RwLock};
use tracing::{error, info};

/// Holds the current reference price table.
///
/// Reads are cheap snapshots; only `refresh` writes, and it swaps the whole
/// table at once after the source has finished.
pub struct MarketPriceService {
    prices: RwLock<ReferencePrices>,
    source: Option<Arc<dyn MarketPriceSource>>,
}

impl MarketPriceService {
    pub fn new(initial: ReferencePrices, source: Option<Arc<dyn MarketPriceSource>>) -> Self {
        Self {
            prices: RwLock::new(initial),
            source,
        }
    }

    pub fn snapshot(&self) -> ReferencePrices {
        match self.prices.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.source.is_some()
    }

    pub async fn refresh(&self) -> Result<ReferencePrices, MarketDataError> {
        let Some(source) = &self.source else {
            return Err(MarketDataError::NoData);
        };

        info!("Refreshing reference prices from {}...", source.name());
        let fresh = source.fetch_prices().await.inspect_err(|e| {
            error!("Reference price refresh failed: {}", e);
        })?;

        if fresh.is_empty() {
            return Err(MarketDataError::NoData);
        }

        match self.prices.write() {
            Ok(mut guard) => *guard = fresh.clone(),
            Err(poisoned) => *poisoned.into_inner() = fresh.clone(),
        }
        info!("Reference prices updated ({} areas)", fresh.len());
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{PriceOrigin, default_market_areas};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::BTreeMap;

    struct StaticSource(BTreeMap<String, f64>);

    #[async_trait]
    impl MarketPriceSource for StaticSource {
        async fn fetch_prices(&self) -> Result<ReferencePrices, MarketDataError> {
            Ok(ReferencePrices::new(self.0.clone(), PriceOrigin::Scraped).refreshed(Utc::now()))
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_table() {
        let mut scraped = BTreeMap::new();
        scraped.insert("Łódź Bałuty".to_string(), 365_000.0);

        let service = MarketPriceService::new(
            ReferencePrices::from_areas(&default_market_areas()),
            Some(Arc::new(StaticSource(scraped))),
        );
        assert_eq!(service.snapshot().get("Łódź Bałuty"), Some(380_000.0));

        let fresh = service.refresh().await.unwrap();
        assert_eq!(fresh.origin, PriceOrigin::Scraped);

        let snapshot = service.snapshot();
        assert_eq!(snapshot.get("Łódź Bałuty"), Some(365_000.0));
        assert!(snapshot.refreshed_at.is_some());
    }

    #[tokio::test]
    async fn test_empty_result_keeps_previous_table() {
        let service = MarketPriceService::new(
            ReferencePrices::from_areas(&default_market_areas()),
            Some(Arc::new(StaticSource(BTreeMap::new()))),
        );

        assert!(matches!(service.refresh().await, Err(MarketDataError::NoData)));
        assert_eq!(service.snapshot().len(), 5);
    }

    #[tokio::test]
    async fn test_refresh_without_source() {
        let service = MarketPriceService::new(ReferencePrices::empty(), None);
        assert!(!service.can_refresh());
        assert!(service.refresh().await.is_err());
    }
}
