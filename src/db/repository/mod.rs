pub mod history;
pub mod medication;
pub mod notification;
pub mod user;

pub use history::*;
pub use medication::*;
pub use notification::*;
pub use user::*;

use uuid::Uuid;

use super::DatabaseError;

/// Parse a TEXT uuid column.
pub(crate) fn parse_uuid(value: &str, column: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|_| DatabaseError::InvalidUuid {
        column: column.into(),
        value: value.into(),
    })
}
