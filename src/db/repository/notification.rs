use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{LeadTime, NotificationSettings};

/// Stored settings for one user. Returns None when never configured.
pub fn get_settings(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<NotificationSettings>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT enabled, lead_time FROM notification_settings WHERE user_id = ?1",
    )?;
    let row = stmt.query_row(params![user_id.to_string()], |row| {
        Ok((row.get::<_, bool>(0)?, row.get::<_, String>(1)?))
    });
    match row {
        Ok((enabled, lead)) => Ok(Some(NotificationSettings {
            enabled,
            lead_time: lead.parse::<LeadTime>()?,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Upsert settings for one user.
pub fn upsert_settings(
    conn: &Connection,
    user_id: &Uuid,
    settings: &NotificationSettings,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notification_settings (user_id, enabled, lead_time, updated_at)
         VALUES (?1, ?2, ?3, datetime('now'))
         ON CONFLICT(user_id) DO UPDATE SET
         enabled = ?2, lead_time = ?3, updated_at = datetime('now')",
        params![
            user_id.to_string(),
            settings.enabled as i32,
            settings.lead_time.as_str(),
        ],
    )?;
    Ok(())
}
