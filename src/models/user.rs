use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A registered account. The password never leaves the auth layer;
/// only the PBKDF2 hash and its salt are stored.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: [u8; 32],
    #[serde(skip_serializing)]
    pub password_salt: [u8; 32],
    pub created_at: DateTime<Utc>,
}
