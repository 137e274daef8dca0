//! Axum routes for the form page, the JSON API and the health probe.

use std::collections::HashMap;
use std::sync::Arc;

use askama::Template;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::application::market_prices::MarketPriceService;
use crate::application::pipeline::{PipelineError, PredictionOutcome, PredictionPipeline};
use crate::application::system::Application;
use crate::domain::record::{FeatureValue, FormState};
use crate::interfaces::web::views::{FormPage, Notice};

const STYLE_CSS: &str = include_str!("../../../templates/style.css");

/// Shared by every handler. The pipeline is immutable after startup; the
/// price service guards its own table.
pub struct AppState {
    pub pipeline: Arc<PredictionPipeline>,
    pub market_prices: Arc<MarketPriceService>,
}

impl AppState {
    pub fn from_application(app: &Application) -> Self {
        Self {
            pipeline: app.pipeline.clone(),
            market_prices: app.market_prices.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("Failed to render page: {0}")]
    Template(#[from] askama::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            WebError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::Pipeline(PipelineError::ModelUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            WebError::Pipeline(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            WebError::Template(_) => "template",
            WebError::Pipeline(e) => e.kind(),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if let WebError::Template(e) = &self {
            error!("Template rendering failed: {}", e);
        }
        let body = json!({ "error": self.to_string(), "kind": self.kind() });
        (self.status(), Json(body)).into_response()
    }
}

/// Body of a successful `POST /api/predict`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub prediction: f64,
    pub formatted: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference_pct: Option<f64>,
}

impl From<PredictionOutcome> for PredictResponse {
    fn from(outcome: PredictionOutcome) -> Self {
        Self {
            prediction: outcome.value,
            formatted: outcome.formatted,
            reference: outcome.reference.as_ref().map(|r| r.value),
            reference_formatted: outcome.reference.map(|r| r.formatted),
            difference_pct: outcome.comparison.and_then(|c| c.difference_pct),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct IndexQuery {
    refresh: Option<String>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/predict", get(predict_handler))
        .route("/static/style.css", get(css_handler))
        .route("/market-prices/refresh", post(refresh_handler))
        .route("/api/schema", get(schema_handler))
        .route("/api/predict", post(api_predict_handler))
        .route("/healthz", get(health_handler))
        .with_state(state)
}

/// Form at its defaults, without running the model.
async fn index_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, WebError> {
    let form = FormState::from_defaults(state.pipeline.schema());
    let notice = query.refresh.as_deref().and_then(Notice::from_refresh_status);

    let page = FormPage::build(
        &state.pipeline,
        &form,
        None,
        &state.market_prices.snapshot(),
        state.market_prices.can_refresh(),
        notice,
    );
    Ok(Html(page.render()?))
}

/// Re-runs the whole chain for the submitted form. Pipeline failures are
/// rendered inline so the user can correct the input and resubmit.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>, WebError> {
    let form = FormState::from_pairs(pairs);
    let prices = state.market_prices.snapshot();
    let outcome = state.pipeline.run(&form, &prices);

    let page = FormPage::build(
        &state.pipeline,
        &form,
        Some(&outcome),
        &prices,
        state.market_prices.can_refresh(),
        None,
    );
    Ok(Html(page.render()?))
}

async fn css_handler() -> ([(header::HeaderName, &'static str); 1], &'static str) {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

async fn refresh_handler(State(state): State<Arc<AppState>>) -> Redirect {
    match state.market_prices.refresh().await {
        Ok(_) => Redirect::to("/?refresh=ok"),
        Err(e) => {
            warn!("Market price refresh failed: {}", e);
            Redirect::to("/?refresh=failed")
        }
    }
}

async fn schema_handler(State(state): State<Arc<AppState>>) -> Response {
    Json(state.pipeline.schema().as_ref()).into_response()
}

async fn api_predict_handler(
    State(state): State<Arc<AppState>>,
    Json(values): Json<HashMap<String, FeatureValue>>,
) -> Result<Json<PredictResponse>, WebError> {
    let form = FormState::from(values);
    let outcome = state
        .pipeline
        .run(&form, &state.market_prices.snapshot())?;
    Ok(Json(outcome.into()))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model_loaded": state.pipeline.model().is_ready(),
    }))
}
