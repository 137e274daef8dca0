// Feature schema shared by form and model
pub mod schema;

// Form state and assembled records
pub mod record;

// Model input encoding
pub mod ml;

// Port interfaces
pub mod ports;

// Currency formatting
pub mod currency;

// Reference market prices
pub mod market;

// Domain-specific error types
pub mod errors;
