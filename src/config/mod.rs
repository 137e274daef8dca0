//! Configuration module for Rustimate.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Server, Model and Market data.

mod market_config;
mod model_config;
mod server_config;

pub use market_config::MarketEnvConfig;
pub use model_config::{DEFAULT_MODEL_PATH, ModelEnvConfig};
pub use server_config::{DEFAULT_PORT, ServerEnvConfig};

use crate::domain::currency::CurrencyFormat;
use crate::domain::market::{MarketArea, default_market_areas};
use crate::domain::schema::FeatureSchema;
use crate::infrastructure::market::load_market_areas;
use anyhow::{Context, Result};
use tracing::info;

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub server: ServerEnvConfig,
    pub model: ModelEnvConfig,
    pub market: MarketEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first so a local `.env` file is honored.
    pub fn from_env() -> Result<Self> {
        let server = ServerEnvConfig::from_env().context("Failed to load server config")?;
        let model = ModelEnvConfig::from_env();
        let market = MarketEnvConfig::from_env().context("Failed to load market config")?;

        Ok(Self {
            server,
            model,
            market,
        })
    }

    /// Feature schema from `SCHEMA_PATH`, or the built-in apartment schema.
    pub fn load_schema(&self) -> Result<FeatureSchema> {
        match &self.model.schema_path {
            Some(path) => {
                let schema = FeatureSchema::load(path)?;
                info!("Loaded feature schema from {:?}: {:?}", path, schema.names());
                Ok(schema)
            }
            None => Ok(FeatureSchema::apartment_default()),
        }
    }

    /// Market areas from `MARKET_PRICES_PATH`, or the built-in Łódź table.
    pub fn load_market_areas(&self) -> Result<Vec<MarketArea>> {
        match &self.market.prices_path {
            Some(path) => Ok(load_market_areas(path)?),
            None => Ok(default_market_areas()),
        }
    }

    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat::new(&self.model.currency_symbol, self.model.thousands_separator)
    }
}
