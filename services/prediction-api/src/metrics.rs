use anyhow::Result;
use once_cell::sync::OnceCell;
use prometheus::{register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec, IntGauge};

pub struct PredictionMetrics {
    pub predictions_total: IntCounterVec,
    pub latency_seconds: Histogram,
    pub registry_models: IntGauge,
}

static METRICS: OnceCell<PredictionMetrics> = OnceCell::new();

/// Register with the default prometheus registry (idempotent).
pub fn init_metrics() -> Result<&'static PredictionMetrics> {
    METRICS.get_or_try_init(|| {
        Ok(PredictionMetrics {
            predictions_total: register_int_counter_vec!("forecast_predictions_total", "Prediction requests by outcome", &["outcome"])?,
            latency_seconds: register_histogram!("forecast_prediction_latency_seconds", "Time spent in the prediction pipeline", vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05])?,
            registry_models: register_int_gauge!("forecast_registry_models", "Models in the loaded registry")?,
        })
    })
}

/// `None` until [`init_metrics`] ran; handlers skip recording in that case.
pub fn metrics() -> Option<&'static PredictionMetrics> { METRICS.get() }
