//! Fixtures for tests: small schemas and a random forest fitted on synthetic
//! listings, written in the same artifact format the runtime loads.

use crate::application::ml::artifact::{ArtifactMetadata, ForestModel, ModelArtifact};
use crate::domain::ml::feature_registry::{encoded_column_names, encoded_width, record_to_vector};
use crate::domain::record::{FeatureValue, FormState, Record};
use crate::domain::schema::{FeatureKind, FeatureSchema, FeatureSpec};
use anyhow::{Result, anyhow};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::path::Path;

/// Four-column listing schema: area, location, has_balcony, floor.
pub fn listing_schema() -> FeatureSchema {
    let features = vec![
        FeatureSpec::new(
            "area",
            "Area (m²)",
            FeatureKind::Numeric {
                min: 10.0,
                max: 200.0,
                step: 1.0,
                default: 50.0,
            },
        ),
        FeatureSpec::new(
            "location",
            "Location",
            FeatureKind::Categorical {
                options: vec![
                    "center".to_string(),
                    "old town".to_string(),
                    "suburbs".to_string(),
                ],
                default: "center".to_string(),
            },
        ),
        FeatureSpec::new("has_balcony", "Balcony", FeatureKind::Boolean { default: false }),
        FeatureSpec::new(
            "floor",
            "Floor",
            FeatureKind::Slider {
                min: 0,
                max: 10,
                default: 1,
            },
        ),
    ];
    FeatureSchema::new(features).expect("listing schema is valid")
}

/// Deterministic form states spread over the schema's training domain.
pub fn synthetic_forms(schema: &FeatureSchema, count: usize) -> Vec<FormState> {
    (0..count)
        .map(|i| {
            let mut form = FormState::new();
            for spec in schema {
                let value = match &spec.kind {
                    FeatureKind::Numeric { min, max, step, .. } => {
                        let t = ((i * 7) % 13) as f64 / 12.0;
                        let raw = min + (max - min) * t;
                        FeatureValue::Number((raw / step).round() * step)
                    }
                    FeatureKind::Slider { min, max, .. } => {
                        let span = (max - min + 1) as usize;
                        FeatureValue::Integer(min + (i % span) as i64)
                    }
                    FeatureKind::Categorical { options, .. } => {
                        FeatureValue::Category(options[(i / 2) % options.len()].clone())
                    }
                    FeatureKind::Boolean { .. } => FeatureValue::Flag(i % 3 == 0),
                };
                form.set(&spec.name, value);
            }
            form
        })
        .collect()
}

/// Linear price over the encoded row, so every column matters.
fn synthetic_price(row: &[f64]) -> f64 {
    100_000.0
        + row
            .iter()
            .enumerate()
            .map(|(j, v)| v * 1_000.0 * (j as f64 + 1.0))
            .sum::<f64>()
}

pub fn fit_forest(schema: &FeatureSchema) -> Result<ForestModel> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for form in synthetic_forms(schema, 60) {
        let record = Record::assemble(schema, &form)?;
        let row = record_to_vector(schema, &record)?;
        y.push(synthetic_price(&row));
        x.push(row);
    }

    let x_matrix = DenseMatrix::from_2d_vec(&x).map_err(|e| anyhow!("Matrix error: {}", e))?;
    let params = RandomForestRegressorParameters::default()
        .with_n_trees(10)
        .with_max_depth(6)
        .with_min_samples_split(2);

    RandomForestRegressor::fit(&x_matrix, &y, params).map_err(|e| anyhow!("Training failed: {}", e))
}

pub fn build_artifact(schema: &FeatureSchema) -> Result<ModelArtifact> {
    let model = fit_forest(schema)?;
    let metadata = ArtifactMetadata {
        name: "Synthetic listings forest".to_string(),
        trained_at: None,
        description: Some("fitted on generated data".to_string()),
    };
    Ok(
        ModelArtifact::new(metadata, schema.features().to_vec(), encoded_width(schema), model)
            .with_encoded_columns(encoded_column_names(schema)),
    )
}

pub fn write_artifact(schema: &FeatureSchema, path: &Path) -> Result<()> {
    build_artifact(schema)?.save(path)
}
