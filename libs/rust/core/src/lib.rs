//! Core shared utilities for the forecasting services.

use anyhow::Result;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::RwLock;
use prometheus::{Encoder, TextEncoder};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
pub use config::{load_config, ServiceConfig};

static TRACING_INIT: OnceCell<()> = OnceCell::new();
static NODE_LIVENESS: AtomicBool = AtomicBool::new(true);
static NODE_READINESS: AtomicBool = AtomicBool::new(false);
static STATUS_FIELDS: Lazy<RwLock<Map<String, Value>>> = Lazy::new(|| RwLock::new(Map::new()));

pub fn mark_ready() { NODE_READINESS.store(true, Ordering::SeqCst); }
pub fn clear_ready() { NODE_READINESS.store(false, Ordering::SeqCst); }
pub fn is_ready() -> bool { NODE_READINESS.load(Ordering::SeqCst) }

/// Publish an extra field on `/status` (e.g. registry state).
pub fn set_status_field(key: &str, value: impl Into<Value>) {
    STATUS_FIELDS.write().insert(key.to_string(), value.into());
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `default_level`.
/// Set `FORECAST_JSON_LOG=1` for JSON lines.
pub fn init_tracing(service: &str, default_level: &str) -> Result<()> {
    TRACING_INIT.get_or_try_init(|| -> Result<()> {
        let json = std::env::var("FORECAST_JSON_LOG").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
        let json_layer = json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
        });
        let text_layer = (!json).then(|| {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
        });
        tracing_subscriber::registry().with(env_filter).with(json_layer).with(text_layer).try_init()?;
        Ok(())
    })?;
    info!(target: "forecast", service, "tracing initialized");
    Ok(())
}

/// Liveness, readiness, status and Prometheus routes, merged into a service router.
pub fn health_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/live", get(|| async { axum::Json(serde_json::json!({"live": NODE_LIVENESS.load(Ordering::SeqCst)})) }))
        .route("/ready", get(ready_handler))
        .route("/status", get(|| async { axum::Json(status_snapshot()) }))
        .route("/metrics", get(metrics_handler))
}

fn status_snapshot() -> Value {
    let mut body = Map::new();
    body.insert("live".into(), NODE_LIVENESS.load(Ordering::SeqCst).into());
    body.insert("ready".into(), NODE_READINESS.load(Ordering::SeqCst).into());
    for (k, v) in STATUS_FIELDS.read().iter() { body.insert(k.clone(), v.clone()); }
    Value::Object(body)
}

async fn ready_handler() -> impl IntoResponse {
    let ready = is_ready();
    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, axum::Json(serde_json::json!({"ready": ready})))
}

async fn metrics_handler() -> axum::response::Response {
    let metric_families = prometheus::gather();
    let mut buf = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&metric_families, &mut buf) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("encode error: {e}")).into_response();
    }
    (StatusCode::OK, [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], buf).into_response()
}

/// Resolves on ctrl-c; used for graceful shutdown of servers.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error=?e, "ctrl_c listener failed");
    }
    clear_ready();
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_includes_published_fields() {
        set_status_field("model_count", 3);
        let snap = status_snapshot();
        assert_eq!(snap["model_count"], 3);
        assert_eq!(snap["live"], true);
    }

    #[test]
    fn tracing_init_is_idempotent() {
        init_tracing("test", "info").unwrap();
        init_tracing("test", "debug").unwrap();
    }
}
