pub mod artifact;
pub mod predictor;
pub mod smartcore_predictor;

pub use predictor::PricePredictor;
pub use smartcore_predictor::SmartCorePredictor;
