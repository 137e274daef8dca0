//! The full form-to-result chain, recomputed on every input change.
//!
//! `PredictionPipeline::run` is a pure function of the form state and the
//! reference table: assemble the record, call the model, format the result.
//! It halts on the first failing step.

use crate::application::ml::PricePredictor;
use crate::domain::currency::CurrencyFormat;
use crate::domain::errors::{ArtifactLoadError, PredictionError, SchemaMismatchError};
use crate::domain::market::{Comparison, ReferencePrices};
use crate::domain::record::{FormState, Record};
use crate::domain::schema::FeatureSchema;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Form key of the "show comparison chart" toggle.
pub const SHOW_CHART_FIELD: &str = "show_chart";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(Arc<ArtifactLoadError>),

    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::ModelUnavailable(_) => "artifact_load",
            PipelineError::Schema(_) => "schema_mismatch",
            PipelineError::Prediction(_) => "prediction",
        }
    }
}

/// Loaded model, or the reason it could not be loaded.
#[derive(Clone)]
pub enum ModelHandle {
    Ready(Arc<dyn PricePredictor>),
    Failed(Arc<ArtifactLoadError>),
}

impl ModelHandle {
    pub fn from_load<P>(result: Result<P, ArtifactLoadError>) -> Self
    where
        P: PricePredictor + 'static,
    {
        match result {
            Ok(predictor) => ModelHandle::Ready(Arc::new(predictor)),
            Err(e) => ModelHandle::Failed(Arc::new(e)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelHandle::Ready(_))
    }

    pub fn load_error(&self) -> Option<&ArtifactLoadError> {
        match self {
            ModelHandle::Failed(e) => Some(e),
            ModelHandle::Ready(_) => None,
        }
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelHandle::Ready(p) => write!(f, "Ready({} {})", p.name(), p.version()),
            ModelHandle::Failed(e) => write!(f, "Failed({})", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceView {
    pub level: String,
    pub value: f64,
    pub formatted: String,
}

/// Everything the presenter needs to display one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub value: f64,
    pub formatted: String,
    pub reference: Option<ReferenceView>,
    pub comparison: Option<Comparison>,
    /// Whether the comparison chart should be drawn.
    pub show_chart: bool,
}

pub struct PredictionPipeline {
    schema: Arc<FeatureSchema>,
    model: ModelHandle,
    currency: CurrencyFormat,
    comparison_feature: Option<String>,
}

impl PredictionPipeline {
    pub fn new(schema: Arc<FeatureSchema>, model: ModelHandle, currency: CurrencyFormat) -> Self {
        Self {
            schema,
            model,
            currency,
            comparison_feature: None,
        }
    }

    /// Categorical feature whose selected level keys the reference table.
    pub fn with_comparison_feature(mut self, feature: Option<String>) -> Self {
        self.comparison_feature = feature;
        self
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn currency(&self) -> &CurrencyFormat {
        &self.currency
    }

    pub fn run(
        &self,
        form: &FormState,
        reference: &ReferencePrices,
    ) -> Result<PredictionOutcome, PipelineError> {
        let predictor = match &self.model {
            ModelHandle::Ready(p) => p,
            ModelHandle::Failed(e) => return Err(PipelineError::ModelUnavailable(e.clone())),
        };

        let record = Record::assemble(&self.schema, form).inspect_err(|e| {
            warn!("Rejected form submission: {}", e);
        })?;

        let value = predictor.predict(&record).inspect_err(|e| {
            warn!("Prediction failed: {}", e);
        })?;

        Ok(self.present(value, &record, reference, form.flag(SHOW_CHART_FIELD)))
    }

    fn present(
        &self,
        value: f64,
        record: &Record,
        reference: &ReferencePrices,
        wants_chart: bool,
    ) -> PredictionOutcome {
        let reference = self
            .comparison_feature
            .as_deref()
            .and_then(|feature| record.get(feature))
            .and_then(|v| v.as_str())
            .and_then(|level| {
                reference.get(level).map(|price| ReferenceView {
                    level: level.to_string(),
                    value: price,
                    formatted: self.currency.format(price),
                })
            });

        if reference.is_none() && wants_chart {
            debug!("No reference data for this selection, omitting chart");
        }

        let comparison = reference.as_ref().map(|r| Comparison::new(value, r.value));

        PredictionOutcome {
            value,
            formatted: self.currency.format(value),
            show_chart: wants_chart && comparison.is_some(),
            reference,
            comparison,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FeatureValue;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    /// Returns a fixed price and counts nothing; enough to exercise the chain.
    struct FixedPredictor(f64);

    impl PricePredictor for FixedPredictor {
        fn predict(&self, record: &Record) -> Result<f64, PredictionError> {
            if record.get("location") == Some(&FeatureValue::Category("harbour".into())) {
                return Err(PredictionError::UnseenCategory {
                    feature: "location".into(),
                    value: "harbour".into(),
                });
            }
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn version(&self) -> &str {
            "test"
        }
    }

    fn pipeline(price: f64) -> PredictionPipeline {
        PredictionPipeline::new(
            Arc::new(crate::testing::listing_schema()),
            ModelHandle::Ready(Arc::new(FixedPredictor(price))),
            CurrencyFormat::default(),
        )
        .with_comparison_feature(Some("location".to_string()))
    }

    fn reference() -> ReferencePrices {
        let mut prices = BTreeMap::new();
        prices.insert("center".to_string(), 400_000.0);
        ReferencePrices::new(prices, crate::domain::market::PriceOrigin::File)
    }

    fn scenario_form() -> FormState {
        FormState::new()
            .with("area", FeatureValue::Number(50.0))
            .with("location", FeatureValue::Category("center".into()))
            .with("has_balcony", FeatureValue::Flag(true))
            .with("floor", FeatureValue::Integer(3))
    }

    #[test]
    fn test_formats_prediction_and_reference() {
        let outcome = pipeline(450_000.0)
            .run(&scenario_form().with(SHOW_CHART_FIELD, FeatureValue::Flag(true)), &reference())
            .unwrap();

        assert_eq!(outcome.formatted, "450,000 zł");
        assert_eq!(outcome.reference.as_ref().unwrap().formatted, "400,000 zł");
        assert_eq!(outcome.comparison.unwrap().difference_pct, Some(12.5));
        assert!(outcome.show_chart);
    }

    #[test]
    fn test_chart_omitted_without_reference() {
        let form = scenario_form()
            .with("location", FeatureValue::Category("suburbs".into()))
            .with(SHOW_CHART_FIELD, FeatureValue::Flag(true));
        let outcome = pipeline(450_000.0).run(&form, &reference()).unwrap();

        assert_eq!(outcome.formatted, "450,000 zł");
        assert!(outcome.reference.is_none());
        assert!(outcome.comparison.is_none());
        assert!(!outcome.show_chart);
    }

    #[test]
    fn test_chart_only_when_requested() {
        let outcome = pipeline(450_000.0).run(&scenario_form(), &reference()).unwrap();
        assert!(outcome.comparison.is_some());
        assert!(!outcome.show_chart);
    }

    #[test]
    fn test_missing_feature_halts_before_model() {
        let mut form = scenario_form();
        form.remove("floor");

        let err = pipeline(1.0).run(&form, &reference()).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(SchemaMismatchError::MissingFeature { .. })));
        assert_eq!(err.kind(), "schema_mismatch");
    }

    #[test]
    fn test_prediction_error_is_surfaced() {
        let form = scenario_form().with("location", FeatureValue::Category("harbour".into()));
        let err = pipeline(1.0).run(&form, &reference()).unwrap_err();
        assert_eq!(err.kind(), "prediction");
    }

    #[test]
    fn test_failed_model_blocks_predictions() {
        let pipeline = PredictionPipeline::new(
            Arc::new(crate::testing::listing_schema()),
            ModelHandle::Failed(Arc::new(ArtifactLoadError::NotFound {
                path: PathBuf::from("models/missing.json"),
            })),
            CurrencyFormat::default(),
        );

        assert!(!pipeline.model().is_ready());
        let err = pipeline.run(&scenario_form(), &reference()).unwrap_err();
        assert_eq!(err.kind(), "artifact_load");
    }
}
