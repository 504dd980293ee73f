use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_uuid;
use crate::db::DatabaseError;
use crate::models::{DoseTimes, HistoryRecord};

pub fn insert_history(conn: &Connection, record: &HistoryRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO history (id, user_id, name, morning, lunch, evening,
         total_doses, doses_taken, memo, registered_at, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.id.to_string(),
            record.user_id.to_string(),
            record.name,
            record.times.morning as i32,
            record.times.lunch as i32,
            record.times.evening as i32,
            record.total_doses,
            record.doses_taken,
            record.memo,
            record.registered_at,
            record.completed_at,
        ],
    )?;
    Ok(())
}

/// Completed records for one user, sorted by name — the order the
/// history screen displays.
pub fn list_history(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<HistoryRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, morning, lunch, evening,
         total_doses, doses_taken, memo, registered_at, completed_at
         FROM history WHERE user_id = ?1 ORDER BY name COLLATE NOCASE",
    )?;
    let rows = stmt.query_map(params![user_id.to_string()], history_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(history_from_row(row?)?);
    }
    Ok(records)
}

pub fn get_history(
    conn: &Connection,
    user_id: &Uuid,
    id: &Uuid,
) -> Result<Option<HistoryRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, morning, lunch, evening,
         total_doses, doses_taken, memo, registered_at, completed_at
         FROM history WHERE user_id = ?1 AND id = ?2",
    )?;
    let row = stmt.query_row(params![user_id.to_string(), id.to_string()], history_row);
    match row {
        Ok(raw) => Ok(Some(history_from_row(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

type HistoryRow = (
    String,
    String,
    String,
    bool,
    bool,
    bool,
    u32,
    u32,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn history_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

fn history_from_row(raw: HistoryRow) -> Result<HistoryRecord, DatabaseError> {
    let (id, user_id, name, morning, lunch, evening, total, taken, memo, registered_at, completed_at) =
        raw;
    Ok(HistoryRecord {
        id: parse_uuid(&id, "history.id")?,
        user_id: parse_uuid(&user_id, "history.user_id")?,
        name,
        times: DoseTimes {
            morning,
            lunch,
            evening,
        },
        total_doses: total,
        doses_taken: taken,
        memo,
        registered_at,
        completed_at,
    })
}
