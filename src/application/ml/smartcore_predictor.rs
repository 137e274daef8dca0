use super::artifact::{ForestModel, ModelArtifact};
use super::predictor::PricePredictor;
use crate::domain::errors::{ArtifactLoadError, PredictionError};
use crate::domain::ml::feature_registry::{encoded_column_names, encoded_width, record_to_vector};
use crate::domain::record::Record;
use crate::domain::schema::FeatureSchema;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::path::Path;
use tracing::{debug, error, info};

pub struct SmartCorePredictor {
    model: ForestModel,
    schema: FeatureSchema,
    columns: usize,
    name: String,
    version: String,
}

impl std::fmt::Debug for SmartCorePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartCorePredictor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("features", &self.schema.names())
            .finish_non_exhaustive()
    }
}

impl SmartCorePredictor {
    /// Loads the artifact at `path` and checks it against the form schema.
    pub fn load(path: &Path, form_schema: &FeatureSchema) -> Result<Self, ArtifactLoadError> {
        let artifact = ModelArtifact::load(path).inspect_err(|e| {
            error!("Failed to load ML model: {}", e);
        })?;

        let predictor = Self::from_artifact(artifact, form_schema)?;
        info!(
            "Successfully loaded ML model '{}' from {:?} ({} features)",
            predictor.name,
            path,
            predictor.schema.len()
        );
        Ok(predictor)
    }

    pub fn from_artifact(
        artifact: ModelArtifact,
        form_schema: &FeatureSchema,
    ) -> Result<Self, ArtifactLoadError> {
        if artifact.features.is_empty() {
            return Err(ArtifactLoadError::EmptyModel {
                reason: "artifact lists no input features".to_string(),
            });
        }

        let trained = FeatureSchema::new(artifact.features).map_err(|e| {
            ArtifactLoadError::SchemaDrift {
                reason: format!("artifact schema is invalid: {}", e),
            }
        })?;

        form_schema
            .check_compatible(&trained)
            .map_err(|reason| ArtifactLoadError::SchemaDrift { reason })?;

        let width = encoded_width(&trained);
        if artifact.fitted_columns != width {
            return Err(ArtifactLoadError::SchemaDrift {
                reason: format!(
                    "model was fitted on {} columns, schema encodes {}",
                    artifact.fitted_columns, width
                ),
            });
        }

        if !artifact.encoded_columns.is_empty() {
            let expected = encoded_column_names(&trained);
            if artifact.encoded_columns != expected {
                return Err(ArtifactLoadError::SchemaDrift {
                    reason: format!(
                        "model was fitted on columns {:?}, schema encodes {:?}",
                        artifact.encoded_columns, expected
                    ),
                });
            }
        }

        let name = if artifact.metadata.name.trim().is_empty() {
            "SmartCore Random Forest".to_string()
        } else {
            artifact.metadata.name
        };
        let version = match artifact.metadata.trained_at {
            Some(ts) => format!("v{} ({})", artifact.format_version, ts.format("%Y-%m-%d")),
            None => format!("v{}", artifact.format_version),
        };

        Ok(Self {
            model: artifact.model,
            schema: trained,
            columns: width,
            name,
            version,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }
}

impl PricePredictor for SmartCorePredictor {
    fn predict(&self, record: &Record) -> Result<f64, PredictionError> {
        let input_vec = record_to_vector(&self.schema, record)?;
        if input_vec.len() != self.columns {
            return Err(PredictionError::DimensionMismatch {
                expected: self.columns,
                found: input_vec.len(),
            });
        }
        let input_matrix = DenseMatrix::from_2d_vec(&vec![input_vec])
            .map_err(|e| PredictionError::Model(format!("Matrix creation failed: {}", e)))?;

        let predictions = self
            .model
            .predict(&input_matrix)
            .map_err(|e| PredictionError::Model(format!("Prediction failed: {}", e)))?;

        let pred = *predictions.first().ok_or(PredictionError::Empty)?;
        if !pred.is_finite() {
            return Err(PredictionError::NonFinite);
        }

        debug!("Predicted {:.2} for {:?}", pred, record.names());
        Ok(pred)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }
}
