//! Adherence history endpoints.
//!
//! - `GET /api/history` — completed records, sorted by name
//! - `GET /api/history/:id` — full detail

use axum::extract::{Path, State};
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db::repository::history as hist;
use crate::models::{DoseTimes, HistoryRecord};

/// Summary row for the history list screen.
#[derive(Serialize)]
pub struct HistorySummary {
    pub id: String,
    pub name: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistorySummary>,
}

/// `GET /api/history` — completed records for the user.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let records = hist::list_history(&conn, &user.user_id)?;
    Ok(Json(HistoryResponse {
        history: records
            .iter()
            .map(|r| HistorySummary {
                id: r.id.to_string(),
                name: r.name.clone(),
                completed_at: r.completed_at,
            })
            .collect(),
    }))
}

/// Full detail, with the derived fields the history detail screen renders.
#[derive(Serialize)]
pub struct HistoryDetail {
    pub id: String,
    pub name: String,
    pub times: DoseTimes,
    pub total_doses: u32,
    pub doses_taken: u32,
    pub remaining: u32,
    pub percentage: u32,
    pub memo: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl From<&HistoryRecord> for HistoryDetail {
    fn from(r: &HistoryRecord) -> Self {
        Self {
            id: r.id.to_string(),
            name: r.name.clone(),
            times: r.times,
            total_doses: r.total_doses,
            doses_taken: r.doses_taken,
            remaining: r.remaining(),
            percentage: r.percentage(),
            memo: r.memo.clone(),
            registered_at: r.registered_at,
            completed_at: r.completed_at,
        }
    }
}

/// `GET /api/history/:id` — full history record.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<HistoryDetail>, ApiError> {
    let record_id = Uuid::parse_str(&id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid history ID: {e}")))?;

    let conn = ctx.core.open_db()?;
    let record = hist::get_history(&conn, &user.user_id, &record_id)?
        .ok_or_else(|| ApiError::NotFound("History record not found".into()))?;

    Ok(Json(HistoryDetail::from(&record)))
}
