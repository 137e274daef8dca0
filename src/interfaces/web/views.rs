//! Askama view models for the form page.
//!
//! Everything the template prints is prepared here as plain strings so the
//! template itself stays free of formatting logic.

use askama::Template;

use crate::application::form::{Control, Widget, render_controls};
use crate::application::pipeline::{
    PipelineError, PredictionOutcome, PredictionPipeline, SHOW_CHART_FIELD,
};
use crate::domain::market::{PriceOrigin, ReferencePrices};
use crate::domain::record::FormState;

pub const PAGE_TITLE: &str = "Apartment price prediction";

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormPage {
    pub title: &'static str,
    pub banner: Option<String>,
    pub model_ready: bool,
    pub controls: Vec<ControlView>,
    pub chart_field: &'static str,
    pub show_chart: bool,
    pub result: Option<ResultView>,
    pub error: Option<ErrorView>,
    pub market: MarketView,
    pub notice: Option<Notice>,
}

pub struct ControlView {
    pub name: String,
    pub label: String,
    /// One of `number`, `slider`, `select`, `checkbox`.
    pub kind: &'static str,
    pub min: String,
    pub max: String,
    pub step: String,
    pub value: String,
    pub options: Vec<OptionView>,
    pub checked: bool,
}

pub struct OptionView {
    pub value: String,
    pub selected: bool,
}

pub struct ResultView {
    pub formatted: String,
    pub reference: Option<ReferenceLine>,
    pub difference: Option<String>,
    pub chart: Option<ChartView>,
}

pub struct ReferenceLine {
    pub level: String,
    pub formatted: String,
}

/// Bar widths in percent of the longer bar.
pub struct ChartView {
    pub predicted_width: String,
    pub reference_width: String,
    pub reference_formatted: String,
}

pub struct ErrorView {
    pub message: String,
    pub kind: &'static str,
}

pub struct MarketView {
    pub rows: Vec<MarketRow>,
    pub origin: &'static str,
    pub refreshed_at: Option<String>,
    pub can_refresh: bool,
}

pub struct MarketRow {
    pub name: String,
    pub price: String,
}

pub struct Notice {
    pub class: &'static str,
    pub message: String,
}

impl Notice {
    pub fn from_refresh_status(status: &str) -> Option<Self> {
        match status {
            "ok" => Some(Self {
                class: "ok",
                message: "Market prices have been updated.".to_string(),
            }),
            "failed" => Some(Self {
                class: "failed",
                message: "Fetching market prices failed, previous prices are kept.".to_string(),
            }),
            _ => None,
        }
    }
}

impl FormPage {
    /// `outcome` is `None` when the page is shown without running the model.
    pub fn build(
        pipeline: &PredictionPipeline,
        form: &FormState,
        outcome: Option<&Result<PredictionOutcome, PipelineError>>,
        prices: &ReferencePrices,
        can_refresh: bool,
        notice: Option<Notice>,
    ) -> Self {
        let controls = render_controls(pipeline.schema(), form)
            .into_iter()
            .map(ControlView::from)
            .collect();

        let (result, error) = match outcome {
            Some(Ok(outcome)) => (Some(ResultView::from(outcome)), None),
            Some(Err(PipelineError::ModelUnavailable(_))) | None => (None, None),
            Some(Err(e)) => (
                None,
                Some(ErrorView {
                    message: e.to_string(),
                    kind: e.kind(),
                }),
            ),
        };

        Self {
            title: PAGE_TITLE,
            banner: pipeline.model().load_error().map(|e| e.to_string()),
            model_ready: pipeline.model().is_ready(),
            controls,
            chart_field: SHOW_CHART_FIELD,
            show_chart: form.flag(SHOW_CHART_FIELD),
            result,
            error,
            market: MarketView::new(pipeline, prices, can_refresh),
            notice,
        }
    }
}

impl From<Control> for ControlView {
    fn from(control: Control) -> Self {
        let mut view = ControlView {
            name: control.name,
            label: control.label,
            kind: "checkbox",
            min: String::new(),
            max: String::new(),
            step: String::new(),
            value: String::new(),
            options: Vec::new(),
            checked: false,
        };

        match control.widget {
            Widget::NumberInput {
                min,
                max,
                step,
                value,
            } => {
                view.kind = "number";
                view.min = min.to_string();
                view.max = max.to_string();
                view.step = step.to_string();
                view.value = value.to_string();
            }
            Widget::Slider { min, max, value } => {
                view.kind = "slider";
                view.min = min.to_string();
                view.max = max.to_string();
                view.step = "1".to_string();
                view.value = value.to_string();
            }
            Widget::Select { options, selected } => {
                view.kind = "select";
                view.options = options
                    .into_iter()
                    .map(|value| OptionView {
                        selected: value == selected,
                        value,
                    })
                    .collect();
                view.value = selected;
            }
            Widget::Checkbox { checked } => {
                view.checked = checked;
                view.value = checked.to_string();
            }
        }
        view
    }
}

impl From<&PredictionOutcome> for ResultView {
    fn from(outcome: &PredictionOutcome) -> Self {
        let chart = match (&outcome.comparison, &outcome.reference) {
            (Some(comparison), Some(reference)) if outcome.show_chart => {
                let (predicted, reference_ratio) = comparison.bar_ratios();
                Some(ChartView {
                    predicted_width: format!("{:.1}", predicted * 100.0),
                    reference_width: format!("{:.1}", reference_ratio * 100.0),
                    reference_formatted: reference.formatted.clone(),
                })
            }
            _ => None,
        };

        ResultView {
            formatted: outcome.formatted.clone(),
            reference: outcome.reference.as_ref().map(|r| ReferenceLine {
                level: r.level.clone(),
                formatted: r.formatted.clone(),
            }),
            difference: outcome
                .comparison
                .and_then(|c| c.difference_pct)
                .map(|pct| format!("{:+.1}% vs market", pct)),
            chart,
        }
    }
}

impl MarketView {
    fn new(pipeline: &PredictionPipeline, prices: &ReferencePrices, can_refresh: bool) -> Self {
        let currency = pipeline.currency();
        Self {
            rows: prices
                .iter()
                .map(|(name, price)| MarketRow {
                    name: name.clone(),
                    price: currency.format(*price),
                })
                .collect(),
            origin: match prices.origin {
                PriceOrigin::Defaults => "built-in defaults",
                PriceOrigin::File => "price file",
                PriceOrigin::Scraped => "adresowo.pl listings",
            },
            refreshed_at: prices
                .refreshed_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            can_refresh,
        }
    }
}
