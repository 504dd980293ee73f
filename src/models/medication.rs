use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which scheduled times of day a dose is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseTimes {
    pub morning: bool,
    pub lunch: bool,
    pub evening: bool,
}

impl DoseTimes {
    /// At least one time of day selected.
    pub fn any(&self) -> bool {
        self.morning || self.lunch || self.evening
    }
}

/// An active prescription occupying one compartment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub user_id: Uuid,
    /// 1-based compartment index.
    pub compartment: u8,
    pub name: String,
    pub times: DoseTimes,
    pub total_doses: u32,
    pub doses_taken: u32,
    pub memo: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl Medication {
    pub fn remaining(&self) -> u32 {
        self.total_doses.saturating_sub(self.doses_taken)
    }

    /// Integer percent of doses taken. `total_doses >= 1` is enforced by
    /// request validation and a schema CHECK. Widened so large counts
    /// cannot overflow.
    pub fn percentage(&self) -> u32 {
        (self.doses_taken as u64 * 100 / self.total_doses as u64) as u32
    }
}

/// A medication record moved out of the active set by a complete action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub times: DoseTimes,
    pub total_doses: u32,
    pub doses_taken: u32,
    pub memo: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn remaining(&self) -> u32 {
        self.total_doses.saturating_sub(self.doses_taken)
    }

    pub fn percentage(&self) -> u32 {
        (self.doses_taken as u64 * 100 / self.total_doses as u64) as u32
    }

    /// Build the history counterpart of an active record.
    pub fn from_medication(med: &Medication, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: med.id,
            user_id: med.user_id,
            name: med.name.clone(),
            times: med.times,
            total_doses: med.total_doses,
            doses_taken: med.doses_taken,
            memo: med.memo.clone(),
            registered_at: med.registered_at,
            completed_at,
        }
    }
}
