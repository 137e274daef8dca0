//! Form state and the single-row record handed to the model.

use crate::domain::errors::SchemaMismatchError;
use crate::domain::schema::{FeatureKind, FeatureSchema, FeatureSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single feature value.
///
/// `Text` holds raw, uninterpreted input (query strings, form posts). The
/// assembler coerces it into the typed variant the schema asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Category(String),
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Integer(v) => Some(*v as f64),
            FeatureValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            FeatureValue::Text(_) | FeatureValue::Category(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) | FeatureValue::Category(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FeatureValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            FeatureValue::Text(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Flag(b) => write!(f, "{}", b),
            FeatureValue::Integer(i) => write!(f, "{}", i),
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Text(s) | FeatureValue::Category(s) => write!(f, "{}", s),
        }
    }
}

/// Current values of the form controls, keyed by feature name.
///
/// Keys that are not part of the schema (submit buttons, UI toggles) are
/// kept but ignored when the record is assembled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    values: HashMap<String, FeatureValue>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form state with every control at its training-domain default.
    pub fn from_defaults(schema: &FeatureSchema) -> Self {
        let values = schema
            .iter()
            .map(|spec| (spec.name.clone(), default_value(spec)))
            .collect();
        Self { values }
    }

    /// Builds state from raw `name=value` pairs. A repeated name keeps its
    /// last value, which lets a checkbox override its hidden `false` input.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), FeatureValue::Text(v.into())))
            .collect();
        Self { values }
    }

    pub fn set(&mut self, name: &str, value: FeatureValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn with(mut self, name: &str, value: FeatureValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<FeatureValue> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name)
    }

    /// Interprets a UI toggle such as `show_chart`.
    pub fn flag(&self, name: &str) -> bool {
        match self.values.get(name) {
            Some(FeatureValue::Flag(b)) => *b,
            Some(FeatureValue::Text(s)) => parse_bool(s).unwrap_or(false),
            _ => false,
        }
    }
}

impl From<HashMap<String, FeatureValue>> for FormState {
    fn from(values: HashMap<String, FeatureValue>) -> Self {
        Self { values }
    }
}

pub fn default_value(spec: &FeatureSpec) -> FeatureValue {
    match &spec.kind {
        FeatureKind::Numeric { default, .. } => FeatureValue::Number(*default),
        FeatureKind::Slider { default, .. } => FeatureValue::Integer(*default),
        FeatureKind::Categorical { default, .. } => FeatureValue::Category(default.clone()),
        FeatureKind::Boolean { default } => FeatureValue::Flag(*default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// One structured row whose columns follow the schema exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    columns: Vec<(String, FeatureValue)>,
}

impl Record {
    /// Assembles a record from form state.
    ///
    /// Walks the schema in training order, so the resulting column names,
    /// order and count always equal the schema. Fails on the first feature
    /// that is absent or cannot be read as the declared type.
    pub fn assemble(schema: &FeatureSchema, form: &FormState) -> Result<Self, SchemaMismatchError> {
        let mut columns = Vec::with_capacity(schema.len());

        for spec in schema {
            let raw = form
                .get(&spec.name)
                .ok_or_else(|| SchemaMismatchError::MissingFeature {
                    feature: spec.name.clone(),
                })?;
            columns.push((spec.name.clone(), coerce(spec, raw)?));
        }

        Ok(Self { columns })
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn columns(&self) -> &[(String, FeatureValue)] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn coerce(spec: &FeatureSpec, raw: &FeatureValue) -> Result<FeatureValue, SchemaMismatchError> {
    let coerced = match (&spec.kind, raw) {
        (FeatureKind::Numeric { .. }, FeatureValue::Number(v)) if v.is_finite() => {
            Some(FeatureValue::Number(*v))
        }
        (FeatureKind::Numeric { .. }, FeatureValue::Integer(v)) => {
            Some(FeatureValue::Number(*v as f64))
        }
        (FeatureKind::Numeric { .. }, FeatureValue::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(FeatureValue::Number),

        (FeatureKind::Slider { .. }, FeatureValue::Integer(v)) => Some(FeatureValue::Integer(*v)),
        (FeatureKind::Slider { .. }, FeatureValue::Number(v)) => integral(*v),
        (FeatureKind::Slider { .. }, FeatureValue::Text(s)) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(v) => Some(FeatureValue::Integer(v)),
                Err(_) => s.parse::<f64>().ok().and_then(integral),
            }
        }

        (FeatureKind::Categorical { .. }, FeatureValue::Category(s))
        | (FeatureKind::Categorical { .. }, FeatureValue::Text(s)) => {
            Some(FeatureValue::Category(s.clone()))
        }

        (FeatureKind::Boolean { .. }, FeatureValue::Flag(b)) => Some(FeatureValue::Flag(*b)),
        (FeatureKind::Boolean { .. }, FeatureValue::Text(s)) => parse_bool(s).map(FeatureValue::Flag),

        _ => None,
    };

    coerced.ok_or_else(|| SchemaMismatchError::WrongType {
        feature: spec.name.clone(),
        expected: spec.kind.expected(),
        found: raw.describe(),
    })
}

fn integral(v: f64) -> Option<FeatureValue> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(FeatureValue::Integer(v as i64))
    } else {
        None
    }
}
