//! In-memory mirror of the pillbox hardware state.
//!
//! The box reports its four indicator lights through `POST /api/box/report`;
//! the browser both polls the mirror (`GET /api/box/status`) and writes single
//! slots after register/complete actions. Writers are unordered relative to
//! each other — last write wins — and nothing here survives a restart.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Number of physical compartments in the box.
pub const SLOT_COUNT: usize = 4;

/// Pending notifications kept before the oldest is dropped.
const PENDING_CAP: usize = 64;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// State of one compartment's indicator light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// No medication registered / light off.
    Empty,
    /// Dose taken on schedule.
    Green,
    /// Dose missed or overdue.
    Red,
}

impl std::fmt::Display for SlotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Green => write!(f, "green"),
            Self::Red => write!(f, "red"),
        }
    }
}

/// Slot index outside the physical range.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("slot index {0} outside 1..={SLOT_COUNT}")]
pub struct InvalidSlot(pub u8);

/// Notification pushed by the box firmware, polled by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxNotification {
    /// 1-based compartment index, when the event concerns one slot.
    pub slot: Option<u8>,
    pub message: String,
    /// RFC 3339 arrival timestamp, stamped server-side.
    #[serde(default)]
    pub received_at: String,
}

/// Snapshot returned to pollers.
#[derive(Debug, Clone, Serialize)]
pub struct BoxStatus {
    pub slots: [SlotState; SLOT_COUNT],
    pub last_updated: [Option<String>; SLOT_COUNT],
}

// ═══════════════════════════════════════════════════════════
// Mirror
// ═══════════════════════════════════════════════════════════

/// The process-wide hardware status mirror.
///
/// Held behind an `RwLock` in `CoreState`; all four slot states, their
/// last-updated timestamps, and the pending notification queue live here.
pub struct BoxMirror {
    slots: [SlotState; SLOT_COUNT],
    last_updated: [Option<String>; SLOT_COUNT],
    pending: VecDeque<BoxNotification>,
}

impl BoxMirror {
    pub fn new() -> Self {
        Self {
            slots: [SlotState::Empty; SLOT_COUNT],
            last_updated: Default::default(),
            pending: VecDeque::new(),
        }
    }

    /// Set one slot (1-based index).
    pub fn set_slot(&mut self, slot: u8, state: SlotState) -> Result<(), InvalidSlot> {
        let idx = slot_index(slot)?;
        self.slots[idx] = state;
        self.last_updated[idx] = Some(chrono::Utc::now().to_rfc3339());
        Ok(())
    }

    /// Full-status write from the hardware report endpoint.
    /// Updates every slot timestamp, reported or not changed.
    pub fn report_all(&mut self, states: [SlotState; SLOT_COUNT]) {
        let now = chrono::Utc::now().to_rfc3339();
        self.slots = states;
        for ts in &mut self.last_updated {
            *ts = Some(now.clone());
        }
    }

    /// Current state for pollers.
    pub fn snapshot(&self) -> BoxStatus {
        BoxStatus {
            slots: self.slots,
            last_updated: self.last_updated.clone(),
        }
    }

    /// Queue a notification, dropping the oldest past capacity.
    pub fn push_notification(&mut self, mut notification: BoxNotification) {
        notification.received_at = chrono::Utc::now().to_rfc3339();
        if self.pending.len() >= PENDING_CAP {
            self.pending.pop_front();
        }
        self.pending.push_back(notification);
    }

    /// Hand all pending notifications to the poller, FIFO, clearing the queue.
    pub fn drain_notifications(&mut self) -> Vec<BoxNotification> {
        self.pending.drain(..).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl Default for BoxMirror {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a 1-based API slot index to the internal array index.
pub fn slot_index(slot: u8) -> Result<usize, InvalidSlot> {
    if (1..=SLOT_COUNT as u8).contains(&slot) {
        Ok(usize::from(slot) - 1)
    } else {
        Err(InvalidSlot(slot))
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
