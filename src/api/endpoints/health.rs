//! Health check endpoint.

use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::hardware::SLOT_COUNT;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub slots: usize,
}

/// `GET /api/health` — connection check for the client.
pub async fn check() -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        slots: SLOT_COUNT,
    }))
}
