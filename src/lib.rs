// Library exports for the API binary, the provisioning CLIs and tests.
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use config::Config;
use services::announcements::AnnouncementFeed;
use services::maintenance::MaintenanceStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis_client: RedisClient,
    pub config: Arc<Config>,
    pub announcements: Arc<AnnouncementFeed>,
    pub maintenance: Arc<MaintenanceStore>,
}
