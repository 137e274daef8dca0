use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the serialized model artifact.
///
/// Any of these is fatal for predictions: the process keeps serving the form
/// but shows a blocking banner instead of a result.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("Model artifact not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("Failed to read model artifact {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model artifact {path:?} is corrupted: {source}")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported artifact format version {found} (supported: {supported})")]
    IncompatibleVersion { found: u32, supported: u32 },

    #[error("Artifact was trained on a different feature schema: {reason}")]
    SchemaDrift { reason: String },

    #[error("Model artifact contains no usable model: {reason}")]
    EmptyModel { reason: String },
}

/// Errors raised while turning form values into a model record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaMismatchError {
    #[error("Missing required feature '{feature}'")]
    MissingFeature { feature: String },

    #[error("Feature '{feature}' expects {expected}, got {found}")]
    WrongType {
        feature: String,
        expected: &'static str,
        found: String,
    },
}

/// Errors raised by the model call itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("Record columns {found:?} do not match model columns {expected:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Encoded row has {found} columns, model was fitted on {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Unseen level '{value}' for categorical feature '{feature}'")]
    UnseenCategory { feature: String, value: String },

    #[error("Value for '{feature}' cannot be encoded for the model")]
    InvalidValue { feature: String },

    #[error("Model call failed: {0}")]
    Model(String),

    #[error("Model returned a non-finite prediction")]
    NonFinite,

    #[error("Model returned no prediction")]
    Empty,
}

/// Errors in a feature schema definition (built-in or loaded from TOML).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Feature schema is empty")]
    Empty,

    #[error("Feature name at position {position} is empty")]
    EmptyName { position: usize },

    #[error("Duplicate feature name '{name}'")]
    DuplicateName { name: String },

    #[error("Invalid domain for '{name}': {reason}")]
    InvalidDomain { name: String, reason: String },
}

/// Errors related to fetching reference market prices.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Reference price file {path:?} is invalid: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error("Listing page could not be parsed: {reason}")]
    InvalidPage { reason: String },

    #[error("No reference prices could be collected")]
    NoData,
}
