//! Feature schema shared by the form renderer, the record assembler and the
//! model encoder.
//!
//! The order of features is the training column order. Any change here is a
//! breaking change for existing model artifacts.

use crate::domain::errors::SchemaError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

fn default_step() -> f64 {
    1.0
}

/// Type and training domain of a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    /// Continuous value, rendered as a bounded numeric input.
    Numeric {
        min: f64,
        max: f64,
        #[serde(default = "default_step")]
        step: f64,
        default: f64,
    },
    /// Ordinal value, rendered as a slider.
    Slider { min: i64, max: i64, default: i64 },
    /// One of a fixed, ordered set of levels.
    Categorical {
        options: Vec<String>,
        default: String,
    },
    Boolean {
        #[serde(default)]
        default: bool,
    },
}

impl FeatureKind {
    /// Short tag used in templates and error messages.
    pub fn tag(&self) -> &'static str {
        match self {
            FeatureKind::Numeric { .. } => "numeric",
            FeatureKind::Slider { .. } => "slider",
            FeatureKind::Categorical { .. } => "categorical",
            FeatureKind::Boolean { .. } => "boolean",
        }
    }

    /// Human readable description of the accepted value type.
    pub fn expected(&self) -> &'static str {
        match self {
            FeatureKind::Numeric { .. } => "a number",
            FeatureKind::Slider { .. } => "a whole number",
            FeatureKind::Categorical { .. } => "one of the allowed options",
            FeatureKind::Boolean { .. } => "true or false",
        }
    }
}

/// A named, typed input column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    /// Label shown next to the control; falls back to `name` when empty.
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn new(name: &str, label: &str, kind: FeatureKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
        }
    }

    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidDomain {
            name: self.name.clone(),
            reason,
        };

        match &self.kind {
            FeatureKind::Numeric {
                min,
                max,
                step,
                default,
            } => {
                if !(min.is_finite() && max.is_finite() && default.is_finite()) {
                    return Err(invalid("bounds must be finite".to_string()));
                }
                if min > max {
                    return Err(invalid(format!("min {} > max {}", min, max)));
                }
                if default < min || default > max {
                    return Err(invalid(format!(
                        "default {} outside {}..={}",
                        default, min, max
                    )));
                }
                if step.is_nan() || *step <= 0.0 {
                    return Err(invalid(format!("step must be positive, got {}", step)));
                }
            }
            FeatureKind::Slider { min, max, default } => {
                if min > max {
                    return Err(invalid(format!("min {} > max {}", min, max)));
                }
                if default < min || default > max {
                    return Err(invalid(format!(
                        "default {} outside {}..={}",
                        default, min, max
                    )));
                }
            }
            FeatureKind::Categorical { options, default } => {
                if options.is_empty() {
                    return Err(invalid("no options".to_string()));
                }
                let unique: HashSet<&String> = options.iter().collect();
                if unique.len() != options.len() {
                    return Err(invalid("duplicate options".to_string()));
                }
                if !options.contains(default) {
                    return Err(invalid(format!("default '{}' is not an option", default)));
                }
            }
            FeatureKind::Boolean { .. } => {}
        }
        Ok(())
    }
}

/// Ordered list of features the model was trained on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    features: Vec<FeatureSpec>,
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    features: Vec<FeatureSpec>,
}

impl FeatureSchema {
    pub fn new(features: Vec<FeatureSpec>) -> Result<Self, SchemaError> {
        if features.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::new();
        for (position, spec) in features.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(SchemaError::EmptyName { position });
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    name: spec.name.clone(),
                });
            }
            spec.validate()?;
        }

        Ok(Self { features })
    }

    /// Apartment price schema for Łódź listings.
    /// Column order: area_m2, locality, rooms, photos.
    pub fn apartment_default() -> Self {
        Self {
            features: vec![
                FeatureSpec::new(
                    "area_m2",
                    "Area (m²)",
                    FeatureKind::Numeric {
                        min: 10.0,
                        max: 300.0,
                        step: 0.5,
                        default: 50.0,
                    },
                ),
                FeatureSpec::new(
                    "locality",
                    "District",
                    FeatureKind::Categorical {
                        options: crate::domain::market::DEFAULT_MARKET_AREAS
                            .iter()
                            .map(|area| area.name.to_string())
                            .collect(),
                        default: "Łódź Bałuty".to_string(),
                    },
                ),
                FeatureSpec::new(
                    "rooms",
                    "Number of rooms",
                    FeatureKind::Slider {
                        min: 1,
                        max: 6,
                        default: 3,
                    },
                ),
                FeatureSpec::new(
                    "photos",
                    "Number of photos",
                    FeatureKind::Numeric {
                        min: 0.0,
                        max: 50.0,
                        step: 1.0,
                        default: 10.0,
                    },
                ),
            ],
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SchemaFile = toml::from_str(content).context("Failed to parse schema TOML")?;
        Ok(Self::new(file.features)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid schema file {:?}", path))
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureSpec> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureSpec> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Checks that `trained` encodes records the same way as `self`:
    /// same names, same order, same kinds and same categorical levels.
    /// Labels, bounds and defaults only affect the form and may differ.
    pub fn check_compatible(&self, trained: &FeatureSchema) -> Result<(), String> {
        if self.names() != trained.names() {
            return Err(format!(
                "form columns {:?} vs trained columns {:?}",
                self.names(),
                trained.names()
            ));
        }

        for (ours, theirs) in self.features.iter().zip(trained.features.iter()) {
            match (&ours.kind, &theirs.kind) {
                (
                    FeatureKind::Categorical { options: a, .. },
                    FeatureKind::Categorical { options: b, .. },
                ) => {
                    if a != b {
                        return Err(format!(
                            "levels of '{}' differ: {:?} vs {:?}",
                            ours.name, a, b
                        ));
                    }
                }
                (a, b) if a.tag() != b.tag() => {
                    return Err(format!(
                        "'{}' is {} in the form but {} in the model",
                        ours.name,
                        a.tag(),
                        b.tag()
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FeatureSchema {
    type Item = &'a FeatureSpec;
    type IntoIter = std::slice::Iter<'a, FeatureSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}
