//! Dose reminder settings endpoints.
//!
//! - `GET  /api/notifications/settings` — stored settings, defaults when unset
//! - `POST /api/notifications/settings` — upsert

use axum::extract::State;
use axum::Extension;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db::repository::notification as settings_repo;
use crate::models::NotificationSettings;

/// `GET /api/notifications/settings`.
///
/// A user with no stored row gets the defaults, which are persisted on
/// this first read — the client then always sees a stable document.
pub async fn get_settings(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<NotificationSettings>, ApiError> {
    let conn = ctx.core.open_db()?;
    let settings = match settings_repo::get_settings(&conn, &user.user_id)? {
        Some(stored) => stored,
        None => {
            let defaults = NotificationSettings::default();
            settings_repo::upsert_settings(&conn, &user.user_id, &defaults)?;
            tracing::debug!(user_id = %user.user_id, "initialized default notification settings");
            defaults
        }
    };
    Ok(Json(settings))
}

/// `POST /api/notifications/settings` — store the toggle + lead time.
pub async fn set_settings(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(settings): Json<NotificationSettings>,
) -> Result<Json<NotificationSettings>, ApiError> {
    let conn = ctx.core.open_db()?;
    settings_repo::upsert_settings(&conn, &user.user_id, &settings)?;
    Ok(Json(settings))
}
