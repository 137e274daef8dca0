// Model loading and inference
pub mod ml;

// Form controls derived from the schema
pub mod form;

// Reference price table and refresh
pub mod market_prices;

// Form-to-result chain
pub mod pipeline;

// Startup wiring shared by the binaries
pub mod system;
