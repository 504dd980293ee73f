use serde::{Deserialize, Serialize};

use super::enums::LeadTime;

/// Per-user dose reminder settings.
///
/// A user with no stored row gets the defaults (disabled, 30 minutes),
/// which are also persisted on first read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub lead_time: LeadTime,
}
