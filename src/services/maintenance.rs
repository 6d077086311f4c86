use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use redis::AsyncCommands;
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::{
    error::StoreError,
    models::{
        announcement::normalize_alt,
        auth::Session,
        maintenance::{MaintenanceRow, MaintenanceSettings, ReplaceMaintenanceRequest},
    },
    services::{
        feed::{FeedError, SnapshotFeed, Subscription},
        metrics,
    },
};

pub const MAINTENANCE_CHANNEL: &str = "admin:feed:maintenance";

/// Live view + whole-document replace of the maintenance singleton.
///
/// Reads never fail on an absent row: the synthesized disabled default is
/// delivered instead, so a freshly provisioned environment behaves as
/// "maintenance off" without any seed step.
pub struct MaintenanceStore {
    db: PgPool,
    feed: SnapshotFeed<MaintenanceSettings>,
    publisher: redis::aio::MultiplexedConnection,
}

impl MaintenanceStore {
    pub async fn connect(db: PgPool, redis_client: redis::Client) -> anyhow::Result<Arc<Self>> {
        let publisher = redis_client.get_multiplexed_async_connection().await?;
        let initial = load_settings(&db, Utc::now()).await?;
        metrics::observe_maintenance(initial.enabled);

        let store = Arc::new(Self {
            db,
            feed: SnapshotFeed::new(initial),
            publisher,
        });
        store.clone().spawn_invalidation_listener(redis_client);
        Ok(store)
    }

    pub fn subscribe(&self) -> Subscription<MaintenanceSettings> {
        self.feed.subscribe()
    }

    pub fn latest(&self) -> Result<Arc<MaintenanceSettings>, FeedError> {
        self.feed.latest()
    }

    /// Whole-document overwrite; no partial merge and no length bounds —
    /// the message is free-form operator text.
    pub async fn replace(
        &self,
        session: &Session,
        req: ReplaceMaintenanceRequest,
    ) -> Result<(), StoreError> {
        session.require_operator()?;

        let now = Utc::now();
        sqlx::query(
            "INSERT INTO maintenance_settings
                 (id, enabled, message, message_alt, bypass_token, updated_by, updated_at)
             VALUES (1, $1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                 enabled = EXCLUDED.enabled,
                 message = EXCLUDED.message,
                 message_alt = EXCLUDED.message_alt,
                 bypass_token = EXCLUDED.bypass_token,
                 updated_by = EXCLUDED.updated_by,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(req.enabled)
        .bind(&req.message)
        .bind(normalize_alt(req.message_alt))
        .bind(&req.bypass_token)
        .bind(session.actor())
        .bind(now)
        .execute(&self.db)
        .await?;

        metrics::MAINTENANCE_WRITES_COUNTER.inc();
        self.after_mutation().await
    }

    pub async fn refresh(&self) -> Result<(), StoreError> {
        let settings = load_settings(&self.db, Utc::now()).await?;
        metrics::observe_maintenance(settings.enabled);
        self.feed.publish(settings);
        Ok(())
    }

    async fn after_mutation(&self) -> Result<(), StoreError> {
        self.refresh().await?;
        let mut conn = self.publisher.clone();
        if let Err(e) = conn.publish::<_, _, ()>(MAINTENANCE_CHANNEL, "changed").await {
            warn!("maintenance invalidation publish failed: {e}");
        }
        Ok(())
    }

    fn spawn_invalidation_listener(self: Arc<Self>, client: redis::Client) {
        tokio::spawn(async move {
            let mut pubsub = match client.get_async_pubsub().await {
                Ok(c) => c,
                Err(e) => {
                    error!("maintenance listener: redis pubsub error: {e}");
                    return;
                }
            };
            if let Err(e) = pubsub.subscribe(MAINTENANCE_CHANNEL).await {
                error!("maintenance listener: redis subscribe error: {e}");
                return;
            }

            let mut stream = pubsub.on_message();
            while stream.next().await.is_some() {
                if let Err(e) = self.refresh().await {
                    warn!("maintenance feed refresh failed: {e}");
                    self.feed.publish_error(FeedError(e.to_string()));
                }
            }
            info!("maintenance invalidation listener stopped");
        });
    }
}

async fn load_settings(
    db: &PgPool,
    now: DateTime<Utc>,
) -> Result<MaintenanceSettings, StoreError> {
    let row = sqlx::query_as::<_, MaintenanceRow>(
        "SELECT id, enabled, message, message_alt, bypass_token, updated_by, updated_at
         FROM maintenance_settings WHERE id = 1",
    )
    .fetch_optional(db)
    .await?;

    Ok(row
        .map(MaintenanceSettings::from)
        .unwrap_or_else(|| MaintenanceSettings::default_disabled(now)))
}
