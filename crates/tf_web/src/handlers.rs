use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tf_core::{AnalysisRequest, AnalysisResult};
use tracing::info;

use crate::error::{ApiError, INVALID_JSON, MISSING_URL};
use crate::AppState;

pub const HEALTH_MESSAGE: &str = "Turning Flow Analyzer API is running";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn health(method: Method) -> Result<Json<HealthResponse>, ApiError> {
    if method != Method::GET {
        return Err(ApiError::NotFound);
    }
    Ok(Json(HealthResponse {
        status: "healthy",
        message: HEALTH_MESSAGE,
    }))
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Result<Json<AnalysisResult>, ApiError> {
    if method != Method::POST {
        return Err(ApiError::NotFound);
    }
    let request = parse_request(&body)?;

    info!("🧭 Analyzing {} (verbose: {})", request.url, request.verbose);
    let result = state.pipeline.analyze(&request).await;
    info!("🏁 {} finished, success: {}", result.url, result.success);
    Ok(Json(result))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Validates an `/analyze` body. An empty body counts as `{}`.
pub fn parse_request(body: &[u8]) -> Result<AnalysisRequest, ApiError> {
    let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(body).map_err(|_| ApiError::BadRequest(INVALID_JSON.to_string()))?
    };

    let url = value
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(MISSING_URL.to_string()))?;
    let verbose = value.get("verbose").and_then(Value::as_bool).unwrap_or(false);

    Ok(AnalysisRequest::new(url, verbose))
}
