use crate::domain::errors::PredictionError;
use crate::domain::record::Record;

/// Interface for regression models
pub trait PricePredictor: Send + Sync {
    /// Predict a single value for one assembled record.
    /// Must be a pure function of (model, record).
    fn predict(&self, record: &Record) -> Result<f64, PredictionError>;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
