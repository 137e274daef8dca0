use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::application::market_prices::MarketPriceService;
use crate::application::ml::{PricePredictor, SmartCorePredictor};
use crate::application::pipeline::{ModelHandle, PredictionPipeline};
use crate::config::Config;
use crate::domain::market::{PriceOrigin, ReferencePrices};
use crate::domain::ports::MarketPriceSource;
use crate::domain::schema::FeatureSchema;
use crate::infrastructure::market::AdresowoScraper;

/// Everything the front ends share: the pipeline (with its one model handle)
/// and the reference price table.
pub struct Application {
    pub config: Config,
    pub pipeline: Arc<PredictionPipeline>,
    pub market_prices: Arc<MarketPriceService>,
}

impl Application {
    /// Loads schema, model artifact and reference prices.
    ///
    /// A broken schema file or price file is a configuration error and fails
    /// the build. A model that cannot be loaded does not: the application is
    /// still built and the front ends show the load error instead of results.
    pub fn build(config: Config) -> Result<Self> {
        info!("Building Rustimate Application...");

        // 1. Feature schema (single source for form, assembler and encoder)
        let schema = Arc::new(config.load_schema()?);

        // 2. Model artifact, loaded once
        let model = ModelHandle::from_load(SmartCorePredictor::load(
            &config.model.model_path,
            &schema,
        ));
        match &model {
            ModelHandle::Ready(p) => info!("Model ready: {} {}", p.name(), p.version()),
            ModelHandle::Failed(e) => error!("Predictions disabled: {}", e),
        }

        let pipeline = Self::pipeline_for(&config, schema.clone(), model);

        // 3. Reference prices
        let market_prices = Arc::new(Self::market_service(&config)?);

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
            market_prices,
        })
    }

    /// Builds the application around an already constructed model handle.
    pub fn with_model(
        config: Config,
        schema: FeatureSchema,
        model: ModelHandle,
        market_prices: MarketPriceService,
    ) -> Self {
        let pipeline = Self::pipeline_for(&config, Arc::new(schema), model);
        Self {
            config,
            pipeline: Arc::new(pipeline),
            market_prices: Arc::new(market_prices),
        }
    }

    fn pipeline_for(
        config: &Config,
        schema: Arc<FeatureSchema>,
        model: ModelHandle,
    ) -> PredictionPipeline {
        let comparison_feature = config
            .model
            .comparison_feature
            .clone()
            .filter(|feature| {
                let known = schema.get(feature).is_some();
                if !known {
                    warn!("Comparison feature '{}' is not in the schema, chart disabled", feature);
                }
                known
            });

        PredictionPipeline::new(schema, model, config.currency_format())
            .with_comparison_feature(comparison_feature)
    }

    fn market_service(config: &Config) -> Result<MarketPriceService> {
        let areas = config.load_market_areas()?;

        let mut initial = ReferencePrices::from_areas(&areas);
        if config.market.prices_path.is_some() {
            initial.origin = PriceOrigin::File;
        }

        let source: Option<Arc<dyn MarketPriceSource>> = if config.market.scraping_enabled {
            Some(Arc::new(
                AdresowoScraper::new(&config.market.base_url, areas)
                    .with_pages(config.market.scrape_pages)
                    .with_page_delay(Duration::from_millis(config.market.page_delay_ms)),
            ))
        } else {
            None
        };

        Ok(MarketPriceService::new(initial, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_still_builds() {
        let mut config = Config::default();
        config.model.model_path = "does/not/exist.json".into();

        let app = Application::build(config).unwrap();
        assert!(!app.pipeline.model().is_ready());
        assert_eq!(app.market_prices.snapshot().len(), 5);
        assert!(app.market_prices.can_refresh());
    }

    #[test]
    fn test_unknown_comparison_feature_is_dropped() {
        let mut config = Config::default();
        config.model.model_path = "does/not/exist.json".into();
        config.model.comparison_feature = Some("district".to_string());
        config.market.scraping_enabled = false;

        let app = Application::build(config).unwrap();
        assert!(!app.market_prices.can_refresh());
    }
}
