//! Reference prices scraped from adresowo.pl listing pages.

use crate::domain::errors::MarketDataError;
use crate::domain::market::{MarketArea, PriceOrigin, ReferencePrices};
use crate::domain::ports::MarketPriceSource;
use crate::infrastructure::http_client_factory::HttpClientFactory;
use async_trait::async_trait;
use chrono::Utc;
use reqwest_middleware::ClientWithMiddleware;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://adresowo.pl";

const LISTING_SELECTOR: &str = "section.search-results__item";
const TOTAL_PRICE_SELECTOR: &str = ".result-info__price--total span";

pub struct AdresowoScraper {
    client: ClientWithMiddleware,
    base_url: String,
    areas: Vec<MarketArea>,
    pages: u32,
    page_delay: Duration,
}

impl AdresowoScraper {
    pub fn new(base_url: &str, areas: Vec<MarketArea>) -> Self {
        Self {
            client: HttpClientFactory::create_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            areas,
            pages: 8,
            page_delay: Duration::from_millis(500),
        }
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    fn page_url(&self, slug: &str, page: u32) -> String {
        format!("{}/mieszkania/{}/_l{}", self.base_url, slug, page)
    }

    /// Fetches one listing page. `Ok(None)` means the page had no listings.
    async fn fetch_page(&self, url: &str) -> Result<Option<Vec<f64>>, MarketDataError> {
        let failed = |reason: String| MarketDataError::RequestFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?
            .error_for_status()
            .map_err(|e| failed(e.to_string()))?;
        let body = response.text().await.map_err(|e| failed(e.to_string()))?;

        listing_prices(&body)
    }

    /// Average listing price for one area, `None` when nothing was collected.
    async fn average_for(&self, area: &MarketArea) -> Option<f64> {
        if area.slug.is_empty() {
            return None;
        }

        let mut prices = Vec::new();
        for page in 1..=self.pages {
            let url = self.page_url(&area.slug, page);
            match self.fetch_page(&url).await {
                Ok(Some(found)) => {
                    debug!("{}: {} prices on page {}", area.name, found.len(), page);
                    prices.extend(found);
                }
                Ok(None) => break,
                Err(e) => warn!("Skipping listing page: {}", e),
            }

            if page < self.pages && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        if prices.is_empty() {
            None
        } else {
            Some(prices.iter().sum::<f64>() / prices.len() as f64)
        }
    }
}

#[async_trait]
impl MarketPriceSource for AdresowoScraper {
    async fn fetch_prices(&self) -> Result<ReferencePrices, MarketDataError> {
        let mut table = BTreeMap::new();
        let mut live = 0usize;

        for area in &self.areas {
            let price = match self.average_for(area).await {
                Some(avg) => {
                    live += 1;
                    avg
                }
                None => {
                    warn!("No listings collected for {}, using default price", area.name);
                    area.default_price
                }
            };
            table.insert(area.name.clone(), price);
        }

        if live == 0 {
            warn!("No live listings for any area, keeping default prices");
            return Ok(ReferencePrices::new(table, PriceOrigin::Defaults).refreshed(Utc::now()));
        }

        info!(
            "Collected live prices for {}/{} areas",
            live,
            self.areas.len()
        );
        Ok(ReferencePrices::new(table, PriceOrigin::Scraped).refreshed(Utc::now()))
    }

    fn name(&self) -> &str {
        "adresowo.pl"
    }
}

/// Keeps only the digits of a price text such as `450 000 zł`.
pub fn parse_price(text: &str) -> Option<f64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok()
}

fn selector(css: &str) -> Result<Selector, MarketDataError> {
    Selector::parse(css).map_err(|e| MarketDataError::InvalidPage {
        reason: format!("selector {:?}: {}", css, e),
    })
}

/// Total prices of the listings on one page. `None` when the page has no
/// listing sections at all.
fn listing_prices(html: &str) -> Result<Option<Vec<f64>>, MarketDataError> {
    let listing = selector(LISTING_SELECTOR)?;
    let price = selector(TOTAL_PRICE_SELECTOR)?;

    let document = Html::parse_document(html);
    let mut found = false;
    let mut prices = Vec::new();
    for section in document.select(&listing) {
        found = true;
        let Some(span) = section.select(&price).next() else {
            continue;
        };
        if let Some(value) = parse_price(&span.text().collect::<String>()) {
            prices.push(value);
        }
    }

    Ok(found.then_some(prices))
}
