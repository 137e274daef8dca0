//! Reference market prices used by the comparison chart.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Price used when a market area has neither scraped data nor a default.
pub const FALLBACK_MARKET_PRICE: f64 = 400_000.0;

/// A district that can be compared against, with its listing URL slug.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketArea {
    pub name: String,
    pub slug: String,
    pub default_price: f64,
}

pub struct DefaultArea {
    pub name: &'static str,
    pub slug: &'static str,
    pub default_price: f64,
}

pub const DEFAULT_MARKET_AREAS: &[DefaultArea] = &[
    DefaultArea {
        name: "Łódź Bałuty",
        slug: "lodz-baluty",
        default_price: 380_000.0,
    },
    DefaultArea {
        name: "Łódź Górna",
        slug: "lodz-gorna",
        default_price: 420_000.0,
    },
    DefaultArea {
        name: "Łódź Śródmieście",
        slug: "lodz-srodmiescie",
        default_price: 500_000.0,
    },
    DefaultArea {
        name: "Łódź Widzew",
        slug: "lodz-widzew",
        default_price: 450_000.0,
    },
    DefaultArea {
        name: "Łódź Polesie",
        slug: "lodz-polesie",
        default_price: 400_000.0,
    },
];

pub fn default_market_areas() -> Vec<MarketArea> {
    DEFAULT_MARKET_AREAS
        .iter()
        .map(|a| MarketArea {
            name: a.name.to_string(),
            slug: a.slug.to_string(),
            default_price: a.default_price,
        })
        .collect()
}

/// Where the current reference table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceOrigin {
    Defaults,
    File,
    Scraped,
}

/// Average price per category level (e.g. per district).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferencePrices {
    prices: BTreeMap<String, f64>,
    pub origin: PriceOrigin,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl ReferencePrices {
    pub fn new(prices: BTreeMap<String, f64>, origin: PriceOrigin) -> Self {
        Self {
            prices,
            origin,
            refreshed_at: None,
        }
    }

    pub fn from_areas(areas: &[MarketArea]) -> Self {
        let prices = areas
            .iter()
            .map(|a| (a.name.clone(), a.default_price))
            .collect();
        Self::new(prices, PriceOrigin::Defaults)
    }

    pub fn empty() -> Self {
        Self::new(BTreeMap::new(), PriceOrigin::Defaults)
    }

    pub fn refreshed(mut self, at: DateTime<Utc>) -> Self {
        self.refreshed_at = Some(at);
        self
    }

    pub fn get(&self, level: &str) -> Option<f64> {
        self.prices.get(level).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.prices.iter()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Predicted value next to the reference average for the same category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub predicted: f64,
    pub reference: f64,
    /// `(predicted - reference) / reference * 100`, absent for a zero reference.
    pub difference_pct: Option<f64>,
}

impl Comparison {
    pub fn new(predicted: f64, reference: f64) -> Self {
        let difference_pct = if reference != 0.0 {
            Some((predicted - reference) / reference * 100.0)
        } else {
            None
        };
        Self {
            predicted,
            reference,
            difference_pct,
        }
    }

    /// Bar lengths relative to the larger of the two values, in `0.0..=1.0`.
    pub fn bar_ratios(&self) -> (f64, f64) {
        let max = self.predicted.abs().max(self.reference.abs());
        if max == 0.0 {
            return (0.0, 0.0);
        }
        (self.predicted.abs() / max, self.reference.abs() / max)
    }
}
