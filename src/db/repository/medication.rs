use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_uuid;
use crate::db::DatabaseError;
use crate::models::{DoseTimes, HistoryRecord, Medication};

/// Register a medication into a compartment. An existing occupant of the
/// same (user, compartment) is replaced wholesale — last write wins.
pub fn upsert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, user_id, compartment, name, morning, lunch, evening,
         total_doses, doses_taken, memo, registered_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(user_id, compartment) DO UPDATE SET
         id = ?1, name = ?4, morning = ?5, lunch = ?6, evening = ?7,
         total_doses = ?8, doses_taken = ?9, memo = ?10, registered_at = ?11",
        params![
            med.id.to_string(),
            med.user_id.to_string(),
            med.compartment,
            med.name,
            med.times.morning as i32,
            med.times.lunch as i32,
            med.times.evening as i32,
            med.total_doses,
            med.doses_taken,
            med.memo,
            med.registered_at,
        ],
    )?;
    Ok(())
}

pub fn get_medication(
    conn: &Connection,
    user_id: &Uuid,
    compartment: u8,
) -> Result<Option<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, compartment, name, morning, lunch, evening,
         total_doses, doses_taken, memo, registered_at
         FROM medications WHERE user_id = ?1 AND compartment = ?2",
    )?;
    let row = stmt.query_row(params![user_id.to_string(), compartment], medication_row);
    match row {
        Ok(raw) => Ok(Some(medication_from_row(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Active records for one user, ordered by compartment.
pub fn list_medications(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, compartment, name, morning, lunch, evening,
         total_doses, doses_taken, memo, registered_at
         FROM medications WHERE user_id = ?1 ORDER BY compartment",
    )?;
    let rows = stmt.query_map(params![user_id.to_string()], medication_row)?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medication_from_row(row?)?);
    }
    Ok(meds)
}

/// Increment the consumption counter, saturating at `total_doses`.
/// Returns the updated record, or `None` for an empty compartment.
pub fn record_dose(
    conn: &Connection,
    user_id: &Uuid,
    compartment: u8,
) -> Result<Option<Medication>, DatabaseError> {
    let changed = conn.execute(
        "UPDATE medications SET doses_taken = MIN(doses_taken + 1, total_doses)
         WHERE user_id = ?1 AND compartment = ?2",
        params![user_id.to_string(), compartment],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    get_medication(conn, user_id, compartment)
}

/// Discard a record without a history entry. Returns `false` for an
/// empty compartment.
pub fn delete_medication(
    conn: &Connection,
    user_id: &Uuid,
    compartment: u8,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM medications WHERE user_id = ?1 AND compartment = ?2",
        params![user_id.to_string(), compartment],
    )?;
    Ok(changed > 0)
}

/// Move a record into history: insert the history row stamped with
/// `completed_at`, then delete the active row.
///
/// Deliberately not transactional — a failure between the two statements
/// leaves the history row behind, which the product tolerates (last write
/// wins, no rollback).
pub fn complete_medication(
    conn: &Connection,
    user_id: &Uuid,
    compartment: u8,
    completed_at: DateTime<Utc>,
) -> Result<Option<HistoryRecord>, DatabaseError> {
    let Some(med) = get_medication(conn, user_id, compartment)? else {
        return Ok(None);
    };

    let record = HistoryRecord::from_medication(&med, completed_at);
    super::history::insert_history(conn, &record)?;
    delete_medication(conn, user_id, compartment)?;

    Ok(Some(record))
}

type MedicationRow = (
    String,
    String,
    u8,
    String,
    bool,
    bool,
    bool,
    u32,
    u32,
    Option<String>,
    DateTime<Utc>,
);

fn medication_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MedicationRow> {
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

fn medication_from_row(raw: MedicationRow) -> Result<Medication, DatabaseError> {
    let (id, user_id, compartment, name, morning, lunch, evening, total, taken, memo, registered_at) =
        raw;
    Ok(Medication {
        id: parse_uuid(&id, "medications.id")?,
        user_id: parse_uuid(&user_id, "medications.user_id")?,
        compartment,
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
    })
}
