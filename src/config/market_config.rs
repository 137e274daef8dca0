//! Reference price configuration parsing from environment variables.

use crate::infrastructure::market::adresowo::DEFAULT_BASE_URL;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Market data environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MarketEnvConfig {
    /// CSV with `locality,average_price[,url_slug]`; built-in table when unset.
    pub prices_path: Option<PathBuf>,
    pub base_url: String,
    pub scrape_pages: u32,
    pub page_delay_ms: u64,
    pub scraping_enabled: bool,
}

impl Default for MarketEnvConfig {
    fn default() -> Self {
        Self {
            prices_path: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            scrape_pages: 8,
            page_delay_ms: 500,
            scraping_enabled: true,
        }
    }
}

impl MarketEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            prices_path: env::var("MARKET_PRICES_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            base_url: env::var("MARKET_BASE_URL").unwrap_or(defaults.base_url),
            scrape_pages: env::var("MARKET_SCRAPE_PAGES")
                .unwrap_or_else(|_| defaults.scrape_pages.to_string())
                .parse::<u32>()
                .context("Failed to parse MARKET_SCRAPE_PAGES")?,
            page_delay_ms: env::var("MARKET_PAGE_DELAY_MS")
                .unwrap_or_else(|_| defaults.page_delay_ms.to_string())
                .parse::<u64>()
                .context("Failed to parse MARKET_PAGE_DELAY_MS")?,
            scraping_enabled: env::var("MARKET_SCRAPING_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<bool>()
                .unwrap_or(true),
        })
    }
}
