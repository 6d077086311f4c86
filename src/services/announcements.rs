use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use redis::AsyncCommands;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{
        announcement::{
            normalize_alt, validate_schedule, validate_text, AnnouncementRow, AnnouncementStatus,
            AnnouncementView, CreateAnnouncementRequest, LocalizedText, UpdateAnnouncementRequest,
        },
        auth::Session,
    },
    services::{
        feed::{FeedError, SnapshotFeed, Subscription},
        metrics, status,
    },
};

/// Redis channel carrying invalidation ticks for the announcement list.
/// Payload is irrelevant; receivers re-query and republish.
pub const ANNOUNCEMENTS_CHANNEL: &str = "admin:feed:announcements";

const COLS: &str = "id, title, title_alt, content, content_alt, status,
     publish_at, expires_at, created_by, updated_by, created_at, updated_at";

/// Live view of the announcement collection plus its mutations.
///
/// Every successful mutation reloads the full list (ordered by `created_at`
/// DESC), re-derives each record's status against the current instant, and
/// replaces the feed snapshot. A Redis tick then lets sibling instances do
/// the same, so every connected console converges on the new list.
pub struct AnnouncementFeed {
    db: PgPool,
    feed: SnapshotFeed<Vec<AnnouncementView>>,
    publisher: redis::aio::MultiplexedConnection,
}

impl AnnouncementFeed {
    pub async fn connect(db: PgPool, redis_client: redis::Client) -> anyhow::Result<Arc<Self>> {
        let publisher = redis_client.get_multiplexed_async_connection().await?;
        let initial = load_views(&db, Utc::now()).await?;
        metrics::observe_announcements(&initial);

        let adapter = Arc::new(Self {
            db,
            feed: SnapshotFeed::new(initial),
            publisher,
        });
        adapter.clone().spawn_invalidation_listener(redis_client);
        Ok(adapter)
    }

    /// Open a live subscription delivering the current list immediately and
    /// a fresh full list after every mutation.
    pub fn subscribe(&self) -> Subscription<Vec<AnnouncementView>> {
        self.feed.subscribe()
    }

    pub fn latest(&self) -> Result<Arc<Vec<AnnouncementView>>, FeedError> {
        self.feed.latest()
    }

    pub async fn create(
        &self,
        session: &Session,
        req: CreateAnnouncementRequest,
    ) -> Result<Uuid, StoreError> {
        session.require_operator()?;

        let now = Utc::now();
        let title_alt = normalize_alt(req.title_alt);
        let content_alt = normalize_alt(req.content_alt);
        validate_text(&req.title, title_alt.as_deref(), &req.content, content_alt.as_deref())?;
        let publish_at = req.publish_at.unwrap_or(now);
        validate_schedule(publish_at, req.expires_at)?;
        let status = req.status.unwrap_or(AnnouncementStatus::Draft);

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO announcements
                 (title, title_alt, content, content_alt, status,
                  publish_at, expires_at, created_by, updated_by, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9, $9)
             RETURNING id",
        )
        .bind(&req.title)
        .bind(&title_alt)
        .bind(&req.content)
        .bind(&content_alt)
        .bind(status.to_string())
        .bind(publish_at)
        .bind(req.expires_at)
        .bind(session.actor())
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        metrics::ANNOUNCEMENT_WRITES_COUNTER
            .with_label_values(&["create"])
            .inc();
        self.after_mutation().await?;
        Ok(id)
    }

    /// Full-record edit. Re-validates the merged record and re-derives the
    /// status unless the stored one is sticky.
    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        req: UpdateAnnouncementRequest,
    ) -> Result<(), StoreError> {
        session.require_operator()?;

        let existing = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "SELECT {COLS} FROM announcements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        let now = Utc::now();
        let title_alt = normalize_alt(req.title_alt);
        let content_alt = normalize_alt(req.content_alt);
        validate_text(&req.title, title_alt.as_deref(), &req.content, content_alt.as_deref())?;
        let publish_at = req.publish_at.unwrap_or(existing.publish_at);
        validate_schedule(publish_at, req.expires_at)?;

        let status = status::project(existing.stored_status(), req.expires_at, now);

        let result = sqlx::query(
            "UPDATE announcements SET
                 title = $2, title_alt = $3, content = $4, content_alt = $5,
                 status = $6, publish_at = $7, expires_at = $8,
                 updated_by = $9, updated_at = $10
             WHERE id = $1",
        )
        .bind(id)
        .bind(&req.title)
        .bind(&title_alt)
        .bind(&req.content)
        .bind(&content_alt)
        .bind(status.to_string())
        .bind(publish_at)
        .bind(req.expires_at)
        .bind(session.actor())
        .bind(now)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        metrics::ANNOUNCEMENT_WRITES_COUNTER
            .with_label_values(&["update"])
            .inc();
        self.after_mutation().await
    }

    /// Permanent removal; there is no soft-delete.
    pub async fn delete(&self, session: &Session, id: Uuid) -> Result<(), StoreError> {
        session.require_operator()?;

        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        metrics::ANNOUNCEMENT_WRITES_COUNTER
            .with_label_values(&["delete"])
            .inc();
        self.after_mutation().await
    }

    /// Operator escape hatch: write the status directly, bypassing
    /// derivation. The next feed tick re-derives non-sticky values.
    pub async fn set_status(
        &self,
        session: &Session,
        id: Uuid,
        new_status: AnnouncementStatus,
    ) -> Result<(), StoreError> {
        session.require_operator()?;

        let result = sqlx::query(
            "UPDATE announcements SET status = $2, updated_by = $3, updated_at = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(new_status.to_string())
        .bind(session.actor())
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        metrics::ANNOUNCEMENT_WRITES_COUNTER
            .with_label_values(&["set_status"])
            .inc();
        self.after_mutation().await
    }

    /// Reload the ordered list and replace the snapshot.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let views = load_views(&self.db, Utc::now()).await?;
        metrics::observe_announcements(&views);
        self.feed.publish(views);
        Ok(())
    }

    async fn after_mutation(&self) -> Result<(), StoreError> {
        self.refresh().await?;
        // Local subscribers are already consistent; the tick is for sibling
        // instances, so a publish failure is logged rather than returned.
        let mut conn = self.publisher.clone();
        if let Err(e) = conn
            .publish::<_, _, ()>(ANNOUNCEMENTS_CHANNEL, "changed")
            .await
        {
            warn!("announcement invalidation publish failed: {e}");
        }
        Ok(())
    }

    fn spawn_invalidation_listener(self: Arc<Self>, client: redis::Client) {
        tokio::spawn(async move {
            let mut pubsub = match client.get_async_pubsub().await {
                Ok(c) => c,
                Err(e) => {
                    error!("announcement listener: redis pubsub error: {e}");
                    return;
                }
            };
            if let Err(e) = pubsub.subscribe(ANNOUNCEMENTS_CHANNEL).await {
                error!("announcement listener: redis subscribe error: {e}");
                return;
            }

            let mut stream = pubsub.on_message();
            while stream.next().await.is_some() {
                if let Err(e) = self.refresh().await {
                    warn!("announcement feed refresh failed: {e}");
                    self.feed.publish_error(FeedError(e.to_string()));
                }
            }
            info!("announcement invalidation listener stopped");
        });
    }
}

async fn load_views(
    db: &PgPool,
    now: DateTime<Utc>,
) -> Result<Vec<AnnouncementView>, StoreError> {
    let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
        "SELECT {COLS} FROM announcements ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(|row| project_view(row, now)).collect())
}

fn project_view(row: AnnouncementRow, now: DateTime<Utc>) -> AnnouncementView {
    let status = status::project(row.stored_status(), row.expires_at, now);
    AnnouncementView {
        id: row.id,
        title: LocalizedText::new(row.title, row.title_alt),
        content: LocalizedText::new(row.content, row.content_alt),
        status,
        publish_at: row.publish_at,
        expires_at: row.expires_at,
        created_by: row.created_by,
        updated_by: row.updated_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(status: &str, expires_at: Option<DateTime<Utc>>) -> AnnouncementRow {
        let now = Utc::now();
        AnnouncementRow {
            id: Uuid::new_v4(),
            title: "新機能追加のお知らせ".into(),
            title_alt: Some("New feature".into()),
            content: "新しい役職が追加されました！".into(),
            content_alt: None,
            status: status.into(),
            publish_at: now - Duration::hours(2),
            expires_at,
            created_by: "op-1".into(),
            updated_by: "op-1".into(),
            created_at: now - Duration::hours(2),
            updated_at: now - Duration::hours(2),
        }
    }

    #[test]
    fn snapshot_projects_active_without_deadline() {
        let view = project_view(row("active", None), Utc::now());
        assert_eq!(view.status, AnnouncementStatus::Active);
    }

    #[test]
    fn snapshot_projects_expired_past_deadline() {
        let now = Utc::now();
        let view = project_view(row("active", Some(now - Duration::hours(1))), now);
        assert_eq!(view.status, AnnouncementStatus::Expired);
    }

    #[test]
    fn snapshot_keeps_sticky_statuses() {
        let now = Utc::now();
        let view = project_view(row("inactive", Some(now - Duration::hours(1))), now);
        assert_eq!(view.status, AnnouncementStatus::Inactive);
    }

    #[test]
    fn unknown_stored_status_falls_back_to_draft() {
        let view = project_view(row("scheduled", None), Utc::now());
        assert_eq!(view.status, AnnouncementStatus::Draft);
    }

    #[test]
    fn bilingual_fields_fold_into_localized_text() {
        let view = project_view(row("active", None), Utc::now());
        assert_eq!(view.title.secondary.as_deref(), Some("New feature"));
        assert_eq!(view.content.secondary, None);
    }
}
