//! Framework-neutral description of the form controls.
//!
//! Both the HTML template and the desktop window render from `Control`, so
//! the widgets always match the schema the record assembler walks.

use crate::domain::record::{FeatureValue, FormState};
use crate::domain::schema::{FeatureKind, FeatureSchema, FeatureSpec};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    NumberInput {
        min: f64,
        max: f64,
        step: f64,
        value: f64,
    },
    Slider {
        min: i64,
        max: i64,
        value: i64,
    },
    Select {
        options: Vec<String>,
        selected: String,
    },
    Checkbox {
        checked: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    pub name: String,
    pub label: String,
    pub widget: Widget,
}

/// One control per feature, in schema order, showing the current form value
/// (or the training default when the form holds nothing readable).
pub fn render_controls(schema: &FeatureSchema, form: &FormState) -> Vec<Control> {
    schema
        .iter()
        .map(|spec| Control {
            name: spec.name.clone(),
            label: spec.display_label().to_string(),
            widget: widget_for(spec, form.get(&spec.name)),
        })
        .collect()
}

fn widget_for(spec: &FeatureSpec, current: Option<&FeatureValue>) -> Widget {
    match &spec.kind {
        FeatureKind::Numeric {
            min,
            max,
            step,
            default,
        } => Widget::NumberInput {
            min: *min,
            max: *max,
            step: *step,
            value: current.and_then(read_f64).unwrap_or(*default),
        },
        FeatureKind::Slider { min, max, default } => Widget::Slider {
            min: *min,
            max: *max,
            value: current
                .and_then(read_f64)
                .filter(|v| v.fract() == 0.0)
                .map(|v| v as i64)
                .unwrap_or(*default),
        },
        FeatureKind::Categorical { options, default } => Widget::Select {
            options: options.clone(),
            selected: current
                .and_then(|v| v.as_str())
                .filter(|s| options.iter().any(|o| o == *s))
                .unwrap_or(default.as_str())
                .to_string(),
        },
        FeatureKind::Boolean { default } => Widget::Checkbox {
            checked: match current {
                Some(FeatureValue::Flag(b)) => *b,
                Some(FeatureValue::Text(s)) => matches!(s.trim(), "true" | "on" | "1"),
                _ => *default,
            },
        },
    }
}

fn read_f64(value: &FeatureValue) -> Option<f64> {
    match value {
        FeatureValue::Text(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    }
    .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_control_per_feature() {
        let schema = FeatureSchema::apartment_default();
        let controls = render_controls(&schema, &FormState::new());

        let names: Vec<&str> = controls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, schema.names());
        assert_eq!(
            controls[0].widget,
            Widget::NumberInput {
                min: 10.0,
                max: 300.0,
                step: 0.5,
                value: 50.0
            }
        );
        assert_eq!(
            controls[2].widget,
            Widget::Slider {
                min: 1,
                max: 6,
                value: 3
            }
        );
    }

    #[test]
    fn test_controls_reflect_form_values() {
        let schema = FeatureSchema::apartment_default();
        let form = FormState::from_pairs(vec![
            ("area_m2", "81"),
            ("locality", "Łódź Polesie"),
            ("rooms", "5"),
        ]);
        let controls = render_controls(&schema, &form);

        assert!(matches!(controls[0].widget, Widget::NumberInput { value, .. } if value == 81.0));
        assert!(matches!(
            &controls[1].widget,
            Widget::Select { selected, .. } if selected == "Łódź Polesie"
        ));
        assert!(matches!(controls[2].widget, Widget::Slider { value: 5, .. }));
        // photos absent from the form falls back to the default
        assert!(matches!(controls[3].widget, Widget::NumberInput { value, .. } if value == 10.0));
    }

    #[test]
    fn test_unknown_level_shows_default_selection() {
        let schema = FeatureSchema::apartment_default();
        let form = FormState::from_pairs(vec![("locality", "Warszawa")]);
        let controls = render_controls(&schema, &form);

        assert!(matches!(
            &controls[1].widget,
            Widget::Select { selected, .. } if selected == "Łódź Bałuty"
        ));
    }

    #[test]
    fn test_checkbox_state() {
        let schema = crate::testing::listing_schema();
        let form = FormState::from_pairs(vec![("has_balcony", "false"), ("has_balcony", "true")]);
        let controls = render_controls(&schema, &form);

        assert_eq!(controls[2].widget, Widget::Checkbox { checked: true });
    }
}
