use crate::{error::AppError, AppState};
use analyzer::AnalysisResponse;
use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;
use std::sync::Arc;
use tracing;

/// # GET /api/health
pub async fn health() -> &'static str {
    "OK"
}

/// # POST /api/analyze-portfolio
/// Values every line item of the posted portfolio against live market data.
///
/// The body is parsed by hand so that malformed JSON is reported as a 400 in
/// the same `{ "error": ... }` shape as every other rejection.
pub async fn analyze_portfolio(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AnalysisResponse>, AppError> {
    tracing::info!(bytes = body.len(), "Portfolio analysis request received.");
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Request body is not valid JSON: {}", e)))?;

    let response = state.analyzer.run(&payload).await?;
    Ok(Json(response))
}
