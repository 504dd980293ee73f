//! Current-medication endpoints — one record per compartment.
//!
//! - `GET    /api/medications` — all compartments for the user
//! - `GET    /api/medications/:compartment` — single record
//! - `POST   /api/medications` — register (replaces an occupant)
//! - `POST   /api/medications/:compartment/taken` — record one dose
//! - `POST   /api/medications/:compartment/complete` — move to history
//! - `DELETE /api/medications/:compartment` — discard without history

use axum::extract::{Path, State};
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db::repository::medication as meds;
use crate::hardware::{SlotState, SLOT_COUNT};
use crate::models::{DoseTimes, Medication};

/// Client-facing shape of an active record, with the derived fields the
/// detail screen renders.
#[derive(Serialize)]
pub struct MedicationView {
    pub compartment: u8,
    pub name: String,
    pub times: DoseTimes,
    pub total_doses: u32,
    pub doses_taken: u32,
    pub remaining: u32,
    pub percentage: u32,
    pub memo: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl From<&Medication> for MedicationView {
    fn from(med: &Medication) -> Self {
        Self {
            compartment: med.compartment,
            name: med.name.clone(),
            times: med.times,
            total_doses: med.total_doses,
            doses_taken: med.doses_taken,
            remaining: med.remaining(),
            percentage: med.percentage(),
            memo: med.memo.clone(),
            registered_at: med.registered_at,
        }
    }
}

#[derive(Serialize)]
pub struct MedicationsResponse {
    pub medications: Vec<MedicationView>,
}

/// `GET /api/medications` — active records, ordered by compartment.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<MedicationsResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let records = meds::list_medications(&conn, &user.user_id)?;
    Ok(Json(MedicationsResponse {
        medications: records.iter().map(MedicationView::from).collect(),
    }))
}

/// `GET /api/medications/:compartment` — single record.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(compartment): Path<u8>,
) -> Result<Json<MedicationView>, ApiError> {
    validate_compartment(compartment)?;
    let conn = ctx.core.open_db()?;
    let med = meds::get_medication(&conn, &user.user_id, compartment)?
        .ok_or_else(|| empty_compartment(compartment))?;
    Ok(Json(MedicationView::from(&med)))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub compartment: u8,
    pub name: String,
    #[serde(default)]
    pub times: DoseTimes,
    pub total_doses: u32,
    pub memo: Option<String>,
}

/// `POST /api/medications` — register a medication into a compartment.
/// An existing occupant is replaced (last write wins).
pub async fn register(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MedicationView>, ApiError> {
    validate_compartment(req.compartment)?;
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Medication name is required".into()));
    }
    if req.total_doses == 0 {
        return Err(ApiError::BadRequest("Total doses must be at least 1".into()));
    }
    if !req.times.any() {
        return Err(ApiError::BadRequest(
            "Select at least one dose time (morning, lunch or evening)".into(),
        ));
    }

    let med = Medication {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        compartment: req.compartment,
        name: req.name.trim().to_string(),
        times: req.times,
        total_doses: req.total_doses,
        doses_taken: 0,
        memo: req.memo,
        registered_at: chrono::Utc::now(),
    };

    let conn = ctx.core.open_db()?;
    meds::upsert_medication(&conn, &med)?;

    tracing::info!(user_id = %user.user_id, compartment = med.compartment, "medication registered");

    Ok(Json(MedicationView::from(&med)))
}

/// `POST /api/medications/:compartment/taken` — record one dose.
pub async fn taken(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(compartment): Path<u8>,
) -> Result<Json<MedicationView>, ApiError> {
    validate_compartment(compartment)?;
    let conn = ctx.core.open_db()?;
    let med = meds::record_dose(&conn, &user.user_id, compartment)?
        .ok_or_else(|| empty_compartment(compartment))?;
    Ok(Json(MedicationView::from(&med)))
}

#[derive(Serialize)]
pub struct CompleteResponse {
    pub history_id: String,
    pub completed_at: DateTime<Utc>,
}

/// `POST /api/medications/:compartment/complete` — move the record into
/// history and clear the compartment's indicator light.
pub async fn complete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(compartment): Path<u8>,
) -> Result<Json<CompleteResponse>, ApiError> {
    validate_compartment(compartment)?;
    let conn = ctx.core.open_db()?;
    let record = meds::complete_medication(&conn, &user.user_id, compartment, chrono::Utc::now())?
        .ok_or_else(|| empty_compartment(compartment))?;

    // Browser-side mirror write: freed slot goes dark. The index was
    // validated above, so this cannot fail. The record is already in
    // history, so a broken mirror lock does not fail the request.
    clear_slot_light(&ctx, compartment);

    tracing::info!(user_id = %user.user_id, compartment, "medication completed");

    Ok(Json(CompleteResponse {
        history_id: record.id.to_string(),
        completed_at: record.completed_at,
    }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// `DELETE /api/medications/:compartment` — discard without a history entry.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(compartment): Path<u8>,
) -> Result<Json<DeleteResponse>, ApiError> {
    validate_compartment(compartment)?;
    let conn = ctx.core.open_db()?;
    if !meds::delete_medication(&conn, &user.user_id, compartment)? {
        return Err(empty_compartment(compartment));
    }

    clear_slot_light(&ctx, compartment);

    Ok(Json(DeleteResponse { deleted: true }))
}

/// Turn a freed compartment's indicator light off. The DB change already
/// committed, so a mirror lock failure is logged rather than returned:
/// the light may stay lit until the next hardware report.
fn clear_slot_light(ctx: &ApiContext, compartment: u8) {
    match ctx.core.write_mirror() {
        Ok(mut mirror) => {
            let _ = mirror.set_slot(compartment, SlotState::Empty);
        }
        Err(e) => {
            tracing::warn!(error = %e, compartment, "could not clear compartment light");
        }
    }
}

fn validate_compartment(compartment: u8) -> Result<(), ApiError> {
    if (1..=SLOT_COUNT as u8).contains(&compartment) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Compartment must be between 1 and {SLOT_COUNT}"
        )))
    }
}

fn empty_compartment(compartment: u8) -> ApiError {
    ApiError::NotFound(format!("Compartment {compartment} is empty"))
}
