//! Account endpoints.
//!
//! - `POST /api/auth/register` — create an account, returns a session token
//! - `POST /api/auth/login` — verify credentials, returns a session token
//! - `POST /api/auth/logout` — revoke the presented token

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth;
use crate::db::repository::user as users;
use crate::models::User;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
}

/// `POST /api/auth/register` — create an account and log in.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email address".into()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let (password_hash, password_salt) = auth::hash_password(&req.password);
    let user = User {
        id: Uuid::new_v4(),
        email: email.clone(),
        password_hash,
        password_salt,
        created_at: chrono::Utc::now(),
    };

    let conn = ctx.core.open_db()?;
    // Duplicate email surfaces as ConstraintViolation → 409
    users::insert_user(&conn, &user)?;

    tracing::info!(user_id = %user.id, "account registered");

    let token = issue_session(&ctx, user.id, email)?;
    Ok(Json(SessionResponse {
        token,
        user_id: user.id.to_string(),
    }))
}

/// `POST /api/auth/login` — verify credentials.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let email = req.email.trim().to_lowercase();

    let conn = ctx.core.open_db()?;
    let user = users::get_user_by_email(&conn, &email)?
        // Same error for unknown email and wrong password
        .ok_or(ApiError::Unauthorized)?;

    if !auth::verify_password(&req.password, &user.password_salt, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = issue_session(&ctx, user.id, user.email)?;
    Ok(Json(SessionResponse {
        token,
        user_id: user.id.to_string(),
    }))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub revoked: bool,
}

/// `POST /api/auth/logout` — revoke the presented bearer token.
pub async fn logout(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, ApiError> {
    let token = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let revoked = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions.revoke(token)
    };

    Ok(Json(LogoutResponse { revoked }))
}

fn issue_session(ctx: &ApiContext, user_id: Uuid, email: String) -> Result<String, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    Ok(sessions.issue(user_id, email))
}
