//! The prediction pipeline: availability, payload shape, required fields, id coercion,
//! model lookup, inference. Each step short-circuits with a typed error.

use crate::context::PredictionContext;
use axum::{http::StatusCode, response::IntoResponse, Json};
use forecast_model::{EntityId, Regressor};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

const ENTITY_FIELD: &str = "entity_id";
const ENTITY_ALIAS: &str = "product_id";
const DAY_FIELD: &str = "day_of_year";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredictError {
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PredictError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PredictError::NotFound(_) => StatusCode::NOT_FOUND,
            PredictError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::ServiceUnavailable(_) => "service_unavailable",
            PredictError::BadRequest(_) => "bad_request",
            PredictError::NotFound(_) => "not_found",
            PredictError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub product_id: EntityId,
    /// Echoed exactly as received.
    pub day_of_year: Value,
    pub predicted_quantity: i64,
}

/// Run the full pipeline on a raw request body.
#[instrument(name = "predict", skip_all, fields(body_len = body.len()))]
pub fn predict(ctx: &PredictionContext, body: &[u8]) -> Result<PredictionResponse, PredictError> {
    let registry = ctx.registry().ok_or_else(|| PredictError::ServiceUnavailable("prediction models not loaded; check server logs".into()))?;

    let payload = parse_payload(body)?;
    let (raw_id, day_of_year) = required_fields(&payload)?;
    let entity_id = coerce_entity_id(raw_id)
        .ok_or_else(|| PredictError::BadRequest(format!("invalid entity_id: {raw_id}; must be a 64-bit signed integer")))?;

    let model = registry.get(entity_id).ok_or_else(|| PredictError::NotFound(format!("no model found for entity_id {entity_id}")))?;

    let feature = day_of_year
        .as_f64()
        .ok_or_else(|| PredictError::BadRequest(format!("invalid day_of_year: {day_of_year}; must be a number")))?;
    if !(1.0..=366.0).contains(&feature) {
        debug!(entity_id, feature, "day_of_year outside calendar range, extrapolating");
    }
    let output = model.predict(feature).map_err(|e| PredictError::Internal(format!("an error occurred during prediction: {e}")))?;
    let predicted_quantity = truncate_quantity(output)?;
    debug!(entity_id, feature, output, predicted_quantity, "prediction served");

    Ok(PredictionResponse { product_id: entity_id, day_of_year: day_of_year.clone(), predicted_quantity })
}

fn parse_payload(body: &[u8]) -> Result<Map<String, Value>, PredictError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PredictError::BadRequest("invalid input: no JSON data received".into()));
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(PredictError::BadRequest("invalid input: expected a JSON object".into())),
        Err(e) => Err(PredictError::BadRequest(format!("invalid input: malformed JSON ({e})"))),
    }
}

/// `null` counts as absent; `0` does not.
fn required_fields(payload: &Map<String, Value>) -> Result<(&Value, &Value), PredictError> {
    let present = |key: &str| payload.get(key).filter(|v| !v.is_null());
    match (present(ENTITY_FIELD).or_else(|| present(ENTITY_ALIAS)), present(DAY_FIELD)) {
        (Some(id), Some(day)) => Ok((id, day)),
        _ => Err(PredictError::BadRequest(format!("missing '{ENTITY_FIELD}' or '{DAY_FIELD}' in request"))),
    }
}

/// Integers pass through, finite floats truncate toward zero, strings must hold an integer.
fn coerce_entity_id(raw: &Value) -> Option<EntityId> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?.trunc();
            in_i64_range(f).then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse::<EntityId>().ok(),
        _ => None,
    }
}

fn truncate_quantity(output: f64) -> Result<i64, PredictError> {
    let q = output.trunc();
    if !in_i64_range(q) {
        return Err(PredictError::Internal(format!("an error occurred during prediction: {output} does not fit an integer quantity")));
    }
    Ok(q as i64)
}

// i64::MAX as f64 rounds up to 2^63, which is itself out of range
fn in_i64_range(f: f64) -> bool { f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 }
