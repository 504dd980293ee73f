//! Hardware status mirror endpoints.
//!
//! Two writers, no ordering guarantee between them:
//! - `POST /api/box/report` — the box firmware pushes a full status frame
//!   (unauthenticated; the firmware has no login flow)
//! - `POST /api/box/slots/:slot` — the browser sets one indicator light
//!
//! Pollers:
//! - `GET /api/box/status` — current slot states + timestamps
//! - `GET /api/box/notifications` — poll-and-drain pending notifications

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::hardware::{BoxNotification, BoxStatus, SlotState, SLOT_COUNT};

#[derive(Deserialize)]
pub struct ReportRequest {
    /// All four slot states, in compartment order.
    pub slots: [SlotState; SLOT_COUNT],
    /// Optional event to queue for the client poller.
    pub notification: Option<BoxNotification>,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub status: &'static str,
    pub received_at: String,
}

/// `POST /api/box/report` — full-frame status write from the firmware.
pub async fn report(
    State(ctx): State<ApiContext>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    if let Some(n) = &req.notification {
        if let Some(slot) = n.slot {
            if !(1..=SLOT_COUNT as u8).contains(&slot) {
                return Err(ApiError::BadRequest(format!(
                    "Notification slot must be between 1 and {SLOT_COUNT}"
                )));
            }
        }
    }

    {
        let mut mirror = ctx.core.write_mirror()?;
        mirror.report_all(req.slots);
        if let Some(notification) = req.notification {
            mirror.push_notification(notification);
        }
    }

    tracing::debug!("hardware status frame received");

    Ok(Json(ReportResponse {
        status: "ok",
        received_at: chrono::Utc::now().to_rfc3339(),
    }))
}

/// `GET /api/box/status` — snapshot for the polling client.
pub async fn status(State(ctx): State<ApiContext>) -> Result<Json<BoxStatus>, ApiError> {
    let snapshot = ctx.core.read_mirror()?.snapshot();
    Ok(Json(snapshot))
}

#[derive(Deserialize)]
pub struct SetSlotRequest {
    pub state: SlotState,
}

/// `POST /api/box/slots/:slot` — browser-side write for one slot.
pub async fn set_slot(
    State(ctx): State<ApiContext>,
    Path(slot): Path<u8>,
    Json(req): Json<SetSlotRequest>,
) -> Result<Json<BoxStatus>, ApiError> {
    let snapshot = {
        let mut mirror = ctx.core.write_mirror()?;
        mirror
            .set_slot(slot, req.state)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        mirror.snapshot()
    };
    Ok(Json(snapshot))
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<BoxNotification>,
}

/// `GET /api/box/notifications` — drain pending notifications, FIFO.
/// The client polls this every 100ms–1s; entries are delivered once.
pub async fn poll_notifications(
    State(ctx): State<ApiContext>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let notifications = ctx.core.write_mirror()?.drain_notifications();
    Ok(Json(NotificationsResponse { notifications }))
}
