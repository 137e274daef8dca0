use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use rustimate::application::market_prices::MarketPriceService;
use rustimate::application::ml::SmartCorePredictor;
use rustimate::application::pipeline::ModelHandle;
use rustimate::application::system::Application;
use rustimate::config::Config;
use rustimate::domain::market::{PriceOrigin, ReferencePrices};
use rustimate::interfaces::web::routes::{AppState, PredictResponse, build_router};
use rustimate::testing::{build_artifact, listing_schema};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Application {
    let schema = listing_schema();
    let artifact = build_artifact(&schema).unwrap();
    let predictor = SmartCorePredictor::from_artifact(artifact, &schema).unwrap();

    let mut prices = BTreeMap::new();
    prices.insert("center".to_string(), 400_000.0);
    prices.insert("old town".to_string(), 460_000.0);

    let mut config = Config::default();
    config.model.comparison_feature = Some("location".to_string());

    Application::with_model(
        config,
        schema,
        ModelHandle::Ready(Arc::new(predictor)),
        MarketPriceService::new(ReferencePrices::new(prices, PriceOrigin::File), None),
    )
}

fn router() -> axum::Router {
    build_router(Arc::new(AppState::from_application(&test_app())))
}

async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn api_predict_returns_formatted_price_and_reference() {
    let resp = router()
        .oneshot(json_post(
            "/api/predict",
            r#"{"area": 50, "location": "center", "has_balcony": true, "floor": 3}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: PredictResponse = serde_json::from_str(&body_string(resp).await).unwrap();
    assert!(body.prediction.is_finite());
    assert!(body.formatted.ends_with(" zł"));
    assert_eq!(body.reference, Some(400_000.0));
    assert_eq!(body.reference_formatted.as_deref(), Some("400,000 zł"));
    assert!(body.difference_pct.is_some());
}

#[tokio::test]
async fn api_predict_without_reference_still_returns_value() {
    let resp = router()
        .oneshot(json_post(
            "/api/predict",
            r#"{"area": 75.5, "location": "suburbs", "has_balcony": false, "floor": 0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert!(body["formatted"].as_str().unwrap().ends_with(" zł"));
    assert!(body.get("reference").is_none());
}

#[tokio::test]
async fn api_predict_missing_feature_is_422() {
    let resp = router()
        .oneshot(json_post(
            "/api/predict",
            r#"{"area": 50, "location": "center", "floor": 3}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(body["kind"], "schema_mismatch");
    assert!(body["error"].as_str().unwrap().contains("has_balcony"));
}

#[tokio::test]
async fn api_predict_unseen_level_is_422() {
    let resp = router()
        .oneshot(json_post(
            "/api/predict",
            r#"{"area": 50, "location": "harbour", "has_balcony": true, "floor": 3}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(body["kind"], "prediction");
}

#[tokio::test]
async fn api_schema_lists_features_in_order() {
    let resp = router()
        .oneshot(Request::builder().uri("/api/schema").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["area", "location", "has_balcony", "floor"]);
    assert_eq!(body[1]["kind"], "categorical");
}

#[tokio::test]
async fn index_renders_one_control_per_feature_without_result() {
    let resp = router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    for name in ["area", "location", "has_balcony", "floor"] {
        assert!(html.contains(&format!("id=\"{}\"", name)), "missing control {}", name);
    }
    assert!(html.contains("type=\"range\""));
    assert!(html.contains("<select"));
    assert!(!html.contains("Estimated price"));
}

#[tokio::test]
async fn predict_page_shows_result_and_chart() {
    let uri = "/predict?area=50&location=center&has_balcony=false&has_balcony=true&floor=3\
               &show_chart=false&show_chart=true";
    let resp = router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Estimated price"));
    assert!(html.contains(" zł"));
    assert!(html.contains("Price comparison"));
    assert!(html.contains("400,000 zł"));
}

#[tokio::test]
async fn predict_page_shows_inline_error_for_bad_input() {
    let uri = "/predict?area=lots&location=center&has_balcony=true&floor=3";
    let resp = router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("class=\"error\""));
    assert!(!html.contains("Estimated price"));
}

#[tokio::test]
async fn healthz_reports_loaded_model() {
    let resp = router()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(body["model_loaded"], true);
}
