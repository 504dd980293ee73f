use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_uuid;
use crate::db::DatabaseError;
use crate::models::User;

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, email, password_hash, password_salt, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.id.to_string(),
            user.email,
            user.password_hash.as_slice(),
            user.password_salt.as_slice(),
            user.created_at,
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation("email already registered".into())
        }
        other => other.into(),
    })?;
    Ok(())
}

pub fn get_user_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, email, password_hash, password_salt, created_at
         FROM users WHERE email = ?1",
    )?;
    let row = stmt.query_row(params![email], user_row);
    match row {
        Ok(raw) => Ok(Some(user_from_row(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user(conn: &Connection, user_id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, email, password_hash, password_salt, created_at
         FROM users WHERE id = ?1",
    )?;
    let row = stmt.query_row(params![user_id.to_string()], user_row);
    match row {
        Ok(raw) => Ok(Some(user_from_row(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

type UserRow = (String, String, Vec<u8>, Vec<u8>, DateTime<Utc>);

fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn user_from_row(raw: UserRow) -> Result<User, DatabaseError> {
    let (id, email, hash, salt, created_at) = raw;
    Ok(User {
        id: parse_uuid(&id, "users.id")?,
        email,
        password_hash: blob32(hash, "users.password_hash")?,
        password_salt: blob32(salt, "users.password_salt")?,
        created_at,
    })
}

fn blob32(bytes: Vec<u8>, column: &str) -> Result<[u8; 32], DatabaseError> {
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| DatabaseError::ConstraintViolation(format!("{column}: expected 32 bytes, got {len}")))
}
