//! Drives the real router over a loopback socket.

use forecast_model::{LinearModel, ModelRegistry};
use prediction_api::{router, PredictionContext};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

async fn spawn(ctx: PredictionContext) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router(Arc::new(ctx))).await.expect("serve");
    });
    addr
}

fn trained() -> PredictionContext {
    let mut models = BTreeMap::new();
    models.insert(101, LinearModel::new(0.25, 30.0));
    models.insert(102, LinearModel::new(-0.125, 50.0));
    PredictionContext::from_registry(ModelRegistry::new(models))
}

async fn post(addr: SocketAddr, body: &str) -> (StatusCode, Value) {
    let resp = Client::new()
        .post(format!("http://{addr}/predict"))
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .expect("request");
    let status = resp.status();
    (status, resp.json().await.expect("json body"))
}

#[tokio::test]
async fn known_product_returns_prediction() {
    let addr = spawn(trained()).await;
    let (status, body) = post(addr, r#"{"entity_id": 101, "day_of_year": 15}"#).await;
    assert_eq!(status, StatusCode::OK);
    // 0.25 * 15 + 30 = 33.75
    assert_eq!(body, json!({"product_id": 101, "day_of_year": 15, "predicted_quantity": 33}));
}

#[tokio::test]
async fn error_kinds_map_to_statuses() {
    let addr = spawn(trained()).await;

    let (status, body) = post(addr, r#"{"entity_id": 999, "day_of_year": 15}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));

    let (status, body) = post(addr, r#"{"day_of_year": 15}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = post(addr, r#"{"entity_id": "abc", "day_of_year": 15}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("\"abc\""));

    let (status, _) = post(addr, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn degraded_service_answers_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = PredictionContext::load(&dir.path().join("prediction_models.json"), None);
    let addr = spawn(ctx).await;
    for body in [r#"{"entity_id": 101, "day_of_year": 15}"#, "{}", "nonsense"] {
        let (status, body) = post(addr, body).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());
    }
    let live: Value = Client::new().get(format!("http://{addr}/live")).send().await.unwrap().json().await.unwrap();
    assert_eq!(live["live"], true);
}

#[tokio::test]
async fn identical_requests_get_identical_answers() {
    let addr = spawn(trained()).await;
    let first = post(addr, r#"{"entity_id": 102, "day_of_year": 120}"#).await;
    let second = post(addr, r#"{"entity_id": 102, "day_of_year": 120}"#).await;
    assert_eq!(first, second);
    assert_eq!(first.1["predicted_quantity"], 35);
}

#[tokio::test]
async fn metrics_count_outcomes() {
    prediction_api::metrics::init_metrics().unwrap();
    let addr = spawn(trained()).await;
    post(addr, r#"{"entity_id": 101, "day_of_year": 1}"#).await;
    let text = Client::new().get(format!("http://{addr}/metrics")).send().await.unwrap().text().await.unwrap();
    assert!(text.contains("forecast_predictions_total"), "{text}");
    assert!(text.contains("forecast_prediction_latency_seconds"));
}
