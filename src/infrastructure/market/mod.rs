pub mod adresowo;
pub mod csv_prices;

pub use adresowo::AdresowoScraper;
pub use csv_prices::load_market_areas;
