//! Prediction service: loads the model registry once and answers `POST /predict`.

use anyhow::{Context, Result};
use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use forecast_core::{health_router, mark_ready, set_status_field, shutdown_signal, ServiceConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub mod context;
pub mod metrics;
pub mod predict;

pub use context::{PredictionContext, RegistryState};
pub use predict::{predict, PredictError, PredictionResponse};

pub fn router(ctx: Arc<PredictionContext>) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .merge(health_router())
        .with_state(ctx)
}

async fn predict_handler(State(ctx): State<Arc<PredictionContext>>, body: Bytes) -> Result<Json<PredictionResponse>, PredictError> {
    let start = Instant::now();
    let result = predict(&ctx, &body);
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e @ (PredictError::Internal(_) | PredictError::ServiceUnavailable(_))) => { warn!(error = %e, "prediction failed"); e.kind() }
        Err(e) => { debug!(error = %e, "prediction rejected"); e.kind() }
    };
    if let Some(m) = metrics::metrics() {
        m.predictions_total.with_label_values(&[outcome]).inc();
        m.latency_seconds.observe(start.elapsed().as_secs_f64());
    }
    result.map(Json)
}

/// Publish registry state on `/status` and flip readiness when models are available.
pub fn publish_registry_status(ctx: &PredictionContext) {
    match ctx.state() {
        RegistryState::Loaded(reg) => {
            set_status_field("registry_loaded", true);
            set_status_field("model_count", reg.len());
            if let Some(m) = metrics::metrics() { m.registry_models.set(reg.len() as i64); }
            mark_ready();
        }
        RegistryState::Unavailable { reason } => {
            set_status_field("registry_loaded", false);
            set_status_field("registry_error", reason.as_str());
        }
    }
}

pub async fn run(cfg: ServiceConfig) -> Result<()> {
    metrics::init_metrics()?;
    let ctx = Arc::new(PredictionContext::load(&cfg.registry_path, cfg.registry_sha256.as_deref()));
    publish_registry_status(&ctx);

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("binding {}", cfg.listen_addr))?;
    info!(addr = %listener.local_addr()?, "prediction api listening");
    axum::serve(listener, router(ctx)).with_graceful_shutdown(shutdown_signal()).await?;
    info!("prediction api stopped");
    Ok(())
}
