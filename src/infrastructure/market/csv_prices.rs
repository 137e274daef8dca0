use crate::domain::errors::MarketDataError;
use crate::domain::market::MarketArea;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct PriceRow {
    locality: String,
    average_price: f64,
    #[serde(default)]
    url_slug: Option<String>,
}

/// Reads `locality,average_price[,url_slug]` rows.
///
/// Rows without a slug still provide a reference price but are skipped by
/// the listing scraper.
pub fn read_market_areas<R: Read>(reader: R) -> Result<Vec<MarketArea>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut areas = Vec::new();
    for row in rdr.deserialize::<PriceRow>() {
        let row = row?;
        areas.push(MarketArea {
            name: row.locality,
            slug: row.url_slug.unwrap_or_default(),
            default_price: row.average_price,
        });
    }
    Ok(areas)
}

pub fn load_market_areas(path: &Path) -> Result<Vec<MarketArea>, MarketDataError> {
    let invalid = |reason: String| MarketDataError::InvalidFile {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|e| invalid(e.to_string()))?;
    let areas = read_market_areas(file).map_err(|e| invalid(e.to_string()))?;

    if areas.is_empty() {
        return Err(invalid("no rows".to_string()));
    }
    if let Some(bad) = areas.iter().find(|a| !a.default_price.is_finite()) {
        return Err(invalid(format!("price for '{}' is not a number", bad.name)));
    }

    info!("Loaded {} reference prices from {:?}", areas.len(), path);
    Ok(areas)
}
