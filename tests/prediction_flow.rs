use rustimate::application::ml::artifact::{ARTIFACT_FORMAT_VERSION, ModelArtifact};
use rustimate::application::ml::{PricePredictor, SmartCorePredictor};
use rustimate::application::pipeline::{
    ModelHandle, PipelineError, PredictionPipeline, SHOW_CHART_FIELD,
};
use rustimate::domain::currency::CurrencyFormat;
use rustimate::domain::errors::{ArtifactLoadError, SchemaMismatchError};
use rustimate::domain::market::{PriceOrigin, ReferencePrices};
use rustimate::domain::record::{FeatureValue, FormState, Record};
use rustimate::domain::schema::FeatureSchema;
use rustimate::testing::{listing_schema, write_artifact};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

fn temp_path(ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rustimate-{}.{}", Uuid::new_v4(), ext))
}

/// Writes a freshly fitted artifact and loads it back through the runtime path.
fn load_fixture(schema: &FeatureSchema) -> anyhow::Result<(SmartCorePredictor, PathBuf)> {
    let path = temp_path("json");
    write_artifact(schema, &path)?;
    let predictor = SmartCorePredictor::load(&path, schema)?;
    Ok((predictor, path))
}

fn scenario_form() -> FormState {
    FormState::new()
        .with("area", FeatureValue::Number(50.0))
        .with("location", FeatureValue::Category("center".to_string()))
        .with("has_balcony", FeatureValue::Flag(true))
        .with("floor", FeatureValue::Integer(3))
}

fn center_only_reference() -> ReferencePrices {
    let mut prices = BTreeMap::new();
    prices.insert("center".to_string(), 420_000.0);
    ReferencePrices::new(prices, PriceOrigin::File)
}

#[test]
fn test_scenario_form_to_currency_text() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();

    let schema = listing_schema();
    let (predictor, path) = load_fixture(&schema)?;

    // 1. Record matches the schema column set
    let record = Record::assemble(&schema, &scenario_form())?;
    assert_eq!(record.names(), vec!["area", "location", "has_balcony", "floor"]);
    assert_eq!(record.len(), 4);

    // 2. One finite number from the model
    let value = predictor.predict(&record)?;
    assert!(value.is_finite());

    // 3. Full chain formats it as currency
    let pipeline = PredictionPipeline::new(
        Arc::new(schema),
        ModelHandle::Ready(Arc::new(predictor)),
        CurrencyFormat::default(),
    )
    .with_comparison_feature(Some("location".to_string()));

    let outcome = pipeline.run(&scenario_form(), &center_only_reference())?;
    assert_eq!(outcome.value, value);
    assert_eq!(outcome.formatted, CurrencyFormat::default().format(value));
    assert!(outcome.formatted.ends_with(" zł"));
    assert!(!outcome.formatted.contains('.'));
    assert!(outcome.formatted.contains(','), "six digit prices are grouped");

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn test_no_reference_omits_chart_but_shows_value() -> anyhow::Result<()> {
    let schema = listing_schema();
    let (predictor, path) = load_fixture(&schema)?;
    let pipeline = PredictionPipeline::new(
        Arc::new(schema),
        ModelHandle::Ready(Arc::new(predictor)),
        CurrencyFormat::default(),
    )
    .with_comparison_feature(Some("location".to_string()));

    let form = scenario_form()
        .with("location", FeatureValue::Category("suburbs".to_string()))
        .with(SHOW_CHART_FIELD, FeatureValue::Flag(true));
    let outcome = pipeline.run(&form, &center_only_reference())?;

    assert!(outcome.formatted.ends_with(" zł"));
    assert!(outcome.reference.is_none());
    assert!(!outcome.show_chart);

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn test_repeated_predictions_are_identical() -> anyhow::Result<()> {
    let schema = listing_schema();
    let (predictor, path) = load_fixture(&schema)?;
    let record = Record::assemble(&schema, &scenario_form())?;

    let first = predictor.predict(&record)?;
    for _ in 0..10 {
        assert_eq!(predictor.predict(&record)?, first);
    }

    // A second load of the same file gives the same answer.
    let reloaded = SmartCorePredictor::load(&path, &schema)?;
    assert_eq!(reloaded.predict(&record)?, first);

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn test_missing_feature_is_schema_mismatch() -> anyhow::Result<()> {
    let schema = listing_schema();
    let mut form = scenario_form();
    form.remove("has_balcony");

    let err = Record::assemble(&schema, &form).unwrap_err();
    assert_eq!(
        err,
        SchemaMismatchError::MissingFeature {
            feature: "has_balcony".to_string()
        }
    );

    let (predictor, path) = load_fixture(&schema)?;
    let pipeline = PredictionPipeline::new(
        Arc::new(schema),
        ModelHandle::Ready(Arc::new(predictor)),
        CurrencyFormat::default(),
    );
    assert!(matches!(
        pipeline.run(&form, &ReferencePrices::empty()),
        Err(PipelineError::Schema(SchemaMismatchError::MissingFeature { .. }))
    ));

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn test_missing_artifact_is_not_found() {
    let schema = listing_schema();
    let err = SmartCorePredictor::load(&temp_path("json"), &schema).unwrap_err();
    assert!(matches!(err, ArtifactLoadError::NotFound { .. }));
}

#[test]
fn test_corrupted_artifact_is_rejected() -> anyhow::Result<()> {
    let path = temp_path("json");
    std::fs::write(&path, b"{\"format_version\": 1, \"features\": [trunc")?;

    assert!(matches!(
        ModelArtifact::load(&path),
        Err(ArtifactLoadError::Corrupted { .. })
    ));

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn test_truncated_model_body_is_corrupted() -> anyhow::Result<()> {
    let path = temp_path("json");
    std::fs::write(&path, b"{\"format_version\": 1, \"features\": []}")?;

    assert!(matches!(
        ModelArtifact::load(&path),
        Err(ArtifactLoadError::Corrupted { .. })
    ));

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn test_newer_format_version_is_incompatible() -> anyhow::Result<()> {
    let path = temp_path("json");
    std::fs::write(&path, b"{\"format_version\": 7, \"model\": {}}")?;

    match ModelArtifact::load(&path) {
        Err(ArtifactLoadError::IncompatibleVersion { found, supported }) => {
            assert_eq!(found, 7);
            assert_eq!(supported, ARTIFACT_FORMAT_VERSION);
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("artifact with version 7 must not load"),
    }

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn test_failed_load_never_yields_a_default_prediction() {
    let schema = Arc::new(listing_schema());
    let model = ModelHandle::from_load(SmartCorePredictor::load(&temp_path("json"), &schema));

    let pipeline = PredictionPipeline::new(schema, model, CurrencyFormat::default());
    let err = pipeline
        .run(&scenario_form(), &ReferencePrices::empty())
        .unwrap_err();
    assert!(matches!(err, PipelineError::ModelUnavailable(_)));
}
