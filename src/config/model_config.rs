//! Model artifact, schema and presentation settings.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "models/price_model.json";

/// Model environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnvConfig {
    pub model_path: PathBuf,
    /// TOML feature schema; the built-in apartment schema when unset.
    pub schema_path: Option<PathBuf>,
    pub currency_symbol: String,
    pub thousands_separator: char,
    /// Categorical feature used to look up reference prices.
    pub comparison_feature: Option<String>,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            schema_path: None,
            currency_symbol: "zł".to_string(),
            thousands_separator: ',',
            comparison_feature: Some("locality".to_string()),
        }
    }
}

impl ModelEnvConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            schema_path: env::var("SCHEMA_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            currency_symbol: env::var("CURRENCY_SUFFIX").unwrap_or(defaults.currency_symbol),
            thousands_separator: env::var("THOUSANDS_SEPARATOR")
                .ok()
                .and_then(|s| s.chars().next())
                .unwrap_or(defaults.thousands_separator),
            comparison_feature: match env::var("COMPARISON_FEATURE") {
                Ok(v) if v.trim().is_empty() => None,
                Ok(v) => Some(v.trim().to_string()),
                Err(_) => defaults.comparison_feature,
            },
        }
    }
}
