use crate::domain::errors::PredictionError;
use crate::domain::record::{FeatureValue, Record};
use crate::domain::schema::{FeatureKind, FeatureSchema};

/// Names of the encoded model columns, in order.
///
/// Numeric, slider and boolean features take one column each. A categorical
/// feature expands into one indicator column per level, in declared order.
/// This layout MUST match the one used when the model was trained.
pub fn encoded_column_names(schema: &FeatureSchema) -> Vec<String> {
    let mut names = Vec::new();
    for spec in schema {
        match &spec.kind {
            FeatureKind::Categorical { options, .. } => {
                names.extend(options.iter().map(|o| format!("{}={}", spec.name, o)));
            }
            _ => names.push(spec.name.clone()),
        }
    }
    names
}

pub fn encoded_width(schema: &FeatureSchema) -> usize {
    schema
        .iter()
        .map(|spec| match &spec.kind {
            FeatureKind::Categorical { options, .. } => options.len(),
            _ => 1,
        })
        .sum()
}

/// Converts an assembled record into the f64 row the model consumes.
pub fn record_to_vector(schema: &FeatureSchema, record: &Record) -> Result<Vec<f64>, PredictionError> {
    if record.names() != schema.names() {
        return Err(PredictionError::ColumnMismatch {
            expected: schema.names().iter().map(|s| s.to_string()).collect(),
            found: record.names().iter().map(|s| s.to_string()).collect(),
        });
    }

    let mut row = Vec::with_capacity(encoded_width(schema));

    for (spec, (_, value)) in schema.iter().zip(record.columns()) {
        let invalid = || PredictionError::InvalidValue {
            feature: spec.name.clone(),
        };

        match &spec.kind {
            FeatureKind::Numeric { .. } | FeatureKind::Slider { .. } => {
                let v = match value {
                    FeatureValue::Number(_) | FeatureValue::Integer(_) => value.as_f64(),
                    _ => None,
                }
                .filter(|v| v.is_finite())
                .ok_or_else(invalid)?;
                row.push(v);
            }
            FeatureKind::Boolean { .. } => {
                let b = value.as_bool().ok_or_else(invalid)?;
                row.push(if b { 1.0 } else { 0.0 });
            }
            FeatureKind::Categorical { options, .. } => {
                let level = value.as_str().ok_or_else(invalid)?;
                let index = options.iter().position(|o| o == level).ok_or_else(|| {
                    PredictionError::UnseenCategory {
                        feature: spec.name.clone(),
                        value: level.to_string(),
                    }
                })?;
                row.extend((0..options.len()).map(|i| if i == index { 1.0 } else { 0.0 }));
            }
        }
    }

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FormState;

    #[test]
    fn test_encoded_width_matches_names() {
        let schema = FeatureSchema::apartment_default();
        assert_eq!(encoded_width(&schema), 8);
        assert_eq!(encoded_column_names(&schema).len(), 8);
        assert_eq!(encoded_column_names(&schema)[1], "locality=Łódź Bałuty");
    }

    #[test]
    fn test_one_hot_encoding() {
        let schema = FeatureSchema::apartment_default();
        let form = FormState::from_defaults(&schema)
            .with("area_m2", FeatureValue::Number(62.0))
            .with("locality", FeatureValue::Category("Łódź Widzew".to_string()))
            .with("rooms", FeatureValue::Integer(2))
            .with("photos", FeatureValue::Number(12.0));
        let record = Record::assemble(&schema, &form).unwrap();

        let row = record_to_vector(&schema, &record).unwrap();
        assert_eq!(row, vec![62.0, 0.0, 0.0, 0.0, 1.0, 0.0, 2.0, 12.0]);
    }

    #[test]
    fn test_unseen_level_is_rejected() {
        let schema = FeatureSchema::apartment_default();
        let form = FormState::from_defaults(&schema)
            .with("locality", FeatureValue::Text("Łódź Teofilów".to_string()));
        let record = Record::assemble(&schema, &form).unwrap();

        assert_eq!(
            record_to_vector(&schema, &record).unwrap_err(),
            PredictionError::UnseenCategory {
                feature: "locality".to_string(),
                value: "Łódź Teofilów".to_string()
            }
        );
    }

    #[test]
    fn test_record_from_other_schema_is_rejected() {
        let schema = FeatureSchema::apartment_default();
        let other = FeatureSchema::new(schema.features()[..2].to_vec()).unwrap();
        let record = Record::assemble(&other, &FormState::from_defaults(&other)).unwrap();

        assert!(matches!(
            record_to_vector(&schema, &record),
            Err(PredictionError::ColumnMismatch { .. })
        ));
    }
}
