use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::StoreError;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Display status of an announcement.
///
/// `Draft` and `Inactive` are sticky: they are operator-set and survive
/// re-derivation. `Active`/`Expired` are recomputed from `expires_at` every
/// time a record is observed or rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementStatus {
    Draft,
    Active,
    Inactive,
    Expired,
}

impl AnnouncementStatus {
    pub fn is_sticky(self) -> bool {
        matches!(self, AnnouncementStatus::Draft | AnnouncementStatus::Inactive)
    }
}

impl std::fmt::Display for AnnouncementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnnouncementStatus::Draft => "draft",
            AnnouncementStatus::Active => "active",
            AnnouncementStatus::Inactive => "inactive",
            AnnouncementStatus::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AnnouncementStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(AnnouncementStatus::Draft),
            "active" => Ok(AnnouncementStatus::Active),
            "inactive" => Ok(AnnouncementStatus::Inactive),
            "expired" => Ok(AnnouncementStatus::Expired),
            _ => Err(anyhow::anyhow!("Unknown status: {s}")),
        }
    }
}

/// UI locale. `Ja` is the primary locale of the console; `En` falls back to
/// the primary text when no translation exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ja,
    En,
}

/// Bilingual text: required primary (Japanese) plus optional secondary
/// (English) translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub primary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

impl LocalizedText {
    pub fn new(primary: impl Into<String>, secondary: Option<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary,
        }
    }

    pub fn resolve(&self, locale: Locale) -> &str {
        match locale {
            Locale::Ja => &self.primary,
            Locale::En => self.secondary.as_deref().unwrap_or(&self.primary),
        }
    }
}

/// DB row struct — status is fetched as TEXT (see migration note).
#[derive(Debug, Clone, FromRow)]
pub struct AnnouncementRow {
    pub id: Uuid,
    pub title: String,
    pub title_alt: Option<String>,
    pub content: String,
    pub content_alt: Option<String>,
    pub status: String,
    pub publish_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnnouncementRow {
    /// Stored status, with the sticky `draft` as the fallback for values an
    /// older schema may have left behind.
    pub fn stored_status(&self) -> AnnouncementStatus {
        self.status.parse().unwrap_or(AnnouncementStatus::Draft)
    }
}

/// Feed projection of a row: bilingual fields folded into `LocalizedText`,
/// status re-derived against `now`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementView {
    pub id: Uuid,
    pub title: LocalizedText,
    pub content: LocalizedText,
    pub status: AnnouncementStatus,
    pub publish_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub title_alt: Option<String>,
    pub content: String,
    pub content_alt: Option<String>,
    /// Defaults to the creation instant.
    pub publish_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Initial status; defaults to `draft`. The console's "publish
    /// immediately" toggle sends `active`.
    pub status: Option<AnnouncementStatus>,
}

/// Full-record edit body: the edit form posts every editable field.
#[derive(Debug, Deserialize)]
pub struct UpdateAnnouncementRequest {
    pub title: String,
    pub title_alt: Option<String>,
    pub content: String,
    pub content_alt: Option<String>,
    /// Omitted keeps the stored instant (the field cannot be unset).
    pub publish_at: Option<DateTime<Utc>>,
    /// Authoritative as sent; omitting clears the expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: AnnouncementStatus,
}

/// Empty or whitespace-only translations count as absent.
pub fn normalize_alt(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Bounds check for the bilingual text fields. Lengths are character counts,
/// not bytes — the primary locale is Japanese.
pub fn validate_text(
    title: &str,
    title_alt: Option<&str>,
    content: &str,
    content_alt: Option<&str>,
) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::validation("title", "must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(StoreError::validation(
            "title",
            format!("must be at most {MAX_TITLE_CHARS} characters"),
        ));
    }
    if let Some(alt) = title_alt {
        if alt.chars().count() > MAX_TITLE_CHARS {
            return Err(StoreError::validation(
                "title_alt",
                format!("must be at most {MAX_TITLE_CHARS} characters"),
            ));
        }
    }
    if content.trim().is_empty() {
        return Err(StoreError::validation("content", "must not be empty"));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(StoreError::validation(
            "content",
            format!("must be at most {MAX_CONTENT_CHARS} characters"),
        ));
    }
    if let Some(alt) = content_alt {
        if alt.chars().count() > MAX_CONTENT_CHARS {
            return Err(StoreError::validation(
                "content_alt",
                format!("must be at most {MAX_CONTENT_CHARS} characters"),
            ));
        }
    }
    Ok(())
}

/// `expires_at`, when present, must lie strictly after `publish_at`.
pub fn validate_schedule(
    publish_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
) -> Result<(), StoreError> {
    if let Some(expires) = expires_at {
        if expires <= publish_at {
            return Err(StoreError::validation(
                "expires_at",
                "must be after publish_at",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn title_boundary_is_100_chars() {
        let ok = "あ".repeat(MAX_TITLE_CHARS);
        let too_long = "あ".repeat(MAX_TITLE_CHARS + 1);
        assert!(validate_text(&ok, None, "content", None).is_ok());
        let err = validate_text(&too_long, None, "content", None).unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "title", .. }));
    }

    #[test]
    fn content_boundary_is_2000_chars() {
        let ok = "x".repeat(MAX_CONTENT_CHARS);
        let too_long = "x".repeat(MAX_CONTENT_CHARS + 1);
        assert!(validate_text("title", None, &ok, None).is_ok());
        let err = validate_text("title", None, &too_long, None).unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "content", .. }));
    }

    #[test]
    fn whitespace_only_title_is_rejected() {
        let err = validate_text(" ", None, "content", None).unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "title", .. }));
    }

    #[test]
    fn alt_fields_share_the_bounds() {
        let long = "y".repeat(MAX_TITLE_CHARS + 1);
        let err = validate_text("title", Some(&long), "content", None).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation { field: "title_alt", .. }
        ));
    }

    #[test]
    fn expiry_must_follow_publish() {
        let publish = Utc::now();
        assert!(validate_schedule(publish, Some(publish)).is_err());
        assert!(validate_schedule(publish, Some(publish - Duration::hours(1))).is_err());
        assert!(validate_schedule(publish, Some(publish + Duration::seconds(1))).is_ok());
        assert!(validate_schedule(publish, None).is_ok());
    }

    #[test]
    fn empty_translation_normalizes_to_absent() {
        assert_eq!(normalize_alt(Some("".into())), None);
        assert_eq!(normalize_alt(Some("  ".into())), None);
        assert_eq!(normalize_alt(Some("New role added!".into())), Some("New role added!".into()));
        assert_eq!(normalize_alt(None), None);
    }

    #[test]
    fn resolve_falls_back_to_primary() {
        let both = LocalizedText::new("新機能のお知らせ", Some("New feature".into()));
        assert_eq!(both.resolve(Locale::Ja), "新機能のお知らせ");
        assert_eq!(both.resolve(Locale::En), "New feature");

        let primary_only = LocalizedText::new("メンテナンスのお知らせ", None);
        assert_eq!(primary_only.resolve(Locale::En), "メンテナンスのお知らせ");
    }

    #[test]
    fn legacy_scheduled_status_is_rejected() {
        assert!("scheduled".parse::<AnnouncementStatus>().is_err());
        assert_eq!(
            "inactive".parse::<AnnouncementStatus>().unwrap(),
            AnnouncementStatus::Inactive
        );
    }

    #[test]
    fn status_display_round_trips() {
        for status in [
            AnnouncementStatus::Draft,
            AnnouncementStatus::Active,
            AnnouncementStatus::Inactive,
            AnnouncementStatus::Expired,
        ] {
            assert_eq!(status.to_string().parse::<AnnouncementStatus>().unwrap(), status);
        }
    }
}
