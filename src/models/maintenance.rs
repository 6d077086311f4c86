use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::announcement::LocalizedText;

/// DB row for the maintenance singleton (id is pinned to 1 by the schema).
#[derive(Debug, Clone, FromRow)]
pub struct MaintenanceRow {
    pub id: i16,
    pub enabled: bool,
    pub message: String,
    pub message_alt: Option<String>,
    pub bypass_token: String,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

/// Maintenance gate as delivered to subscribers. The bypass token is an
/// opaque secret validated by the game servers, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSettings {
    pub enabled: bool,
    pub message: LocalizedText,
    pub bypass_token: String,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceSettings {
    /// Synthesized view when no row has ever been written: the gate is open.
    pub fn default_disabled(now: DateTime<Utc>) -> Self {
        Self {
            enabled: false,
            message: LocalizedText::new("", None),
            bypass_token: String::new(),
            updated_by: "unknown".into(),
            updated_at: now,
        }
    }
}

impl From<MaintenanceRow> for MaintenanceSettings {
    fn from(row: MaintenanceRow) -> Self {
        Self {
            enabled: row.enabled,
            message: LocalizedText::new(row.message, row.message_alt),
            bypass_token: row.bypass_token,
            updated_by: row.updated_by,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplaceMaintenanceRequest {
    pub enabled: bool,
    pub message: String,
    pub message_alt: Option<String>,
    pub bypass_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_disabled_with_empty_fields() {
        let now = Utc::now();
        let settings = MaintenanceSettings::default_disabled(now);
        assert!(!settings.enabled);
        assert_eq!(settings.message.primary, "");
        assert_eq!(settings.bypass_token, "");
        assert_eq!(settings.updated_by, "unknown");
    }
}
