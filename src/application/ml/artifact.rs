//! On-disk model artifact produced by the external training process.
//!
//! The file is JSON: a small header (format version, metadata, the feature
//! schema the model was trained on) followed by the serialized smartcore
//! random forest.

use crate::domain::errors::ArtifactLoadError;
use crate::domain::schema::FeatureSpec;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

/// Artifact format understood by this runtime.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

pub type ForestModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    #[serde(default)]
    pub metadata: ArtifactMetadata,
    /// Feature schema in training column order.
    pub features: Vec<FeatureSpec>,
    /// Width of the encoded row the forest was fitted on.
    pub fitted_columns: usize,
    /// Encoded column names the model was fitted on. Empty when the
    /// training process did not record them.
    #[serde(default)]
    pub encoded_columns: Vec<String>,
    pub model: ForestModel,
}

#[derive(Deserialize)]
struct ArtifactHeader {
    format_version: u32,
}

impl ModelArtifact {
    pub fn new(
        metadata: ArtifactMetadata,
        features: Vec<FeatureSpec>,
        fitted_columns: usize,
        model: ForestModel,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            metadata,
            features,
            fitted_columns,
            encoded_columns: Vec::new(),
            model,
        }
    }

    pub fn with_encoded_columns(mut self, columns: Vec<String>) -> Self {
        self.encoded_columns = columns;
        self
    }

    /// Reads and deserializes an artifact.
    ///
    /// The version header is checked before the model body so that files
    /// from a newer writer report `IncompatibleVersion` rather than a
    /// generic parse failure.
    pub fn load(path: &Path) -> Result<Self, ArtifactLoadError> {
        let bytes = std::fs::read(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ArtifactLoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ArtifactLoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let header: ArtifactHeader =
            serde_json::from_slice(&bytes).map_err(|source| ArtifactLoadError::Corrupted {
                path: path.to_path_buf(),
                source,
            })?;

        if header.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactLoadError::IncompatibleVersion {
                found: header.format_version,
                supported: ARTIFACT_FORMAT_VERSION,
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| ArtifactLoadError::Corrupted {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).context("Failed to serialize model artifact")?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::encoded_width;
    use crate::testing::{build_artifact, listing_schema};

    fn temp_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("rustimate-artifact-{}", std::process::id()))
    }

    #[test]
    fn test_save_then_load_keeps_header() {
        let schema = listing_schema();
        let dir = temp_dir();
        let path = dir.join("nested").join("model.json");

        build_artifact(&schema).unwrap().save(&path).unwrap();
        let loaded = ModelArtifact::load(&path).unwrap();

        assert_eq!(loaded.format_version, ARTIFACT_FORMAT_VERSION);
        assert_eq!(loaded.features, schema.features().to_vec());
        assert_eq!(loaded.fitted_columns, encoded_width(&schema));
        assert_eq!(loaded.metadata.name, "Synthetic listings forest");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_save_into_unwritable_location_fails() {
        let schema = listing_schema();
        let dir = temp_dir().with_extension("file");
        std::fs::write(&dir, b"not a directory").unwrap();

        let result = build_artifact(&schema).unwrap().save(&dir.join("model.json"));
        assert!(result.is_err());

        std::fs::remove_file(dir).unwrap();
    }
}
