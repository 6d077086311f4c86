use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use redis::Client as RedisClient;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jinro_admin_api::{
    config::Config,
    db,
    middleware::auth::JwtSecret,
    routes,
    services::{announcements::AnnouncementFeed, maintenance::MaintenanceStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let redis_client = RedisClient::open(config.redis_url.as_str())?;

    let announcements = AnnouncementFeed::connect(pool.clone(), redis_client.clone()).await?;
    let maintenance = MaintenanceStore::connect(pool.clone(), redis_client.clone()).await?;
    info!("Feeds primed and invalidation listeners running");

    let state = AppState {
        db: pool,
        redis_client,
        config: config.clone(),
        announcements,
        maintenance,
    };

    // CORS: the configured console origin, plus localhost for development.
    let admin_origin = config.admin_origin.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
            return true;
        }
        o == admin_origin
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Auth
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        // Announcements
        .route(
            "/announcements",
            get(routes::announcements::list_announcements)
                .post(routes::announcements::create_announcement),
        )
        .route(
            "/announcements/{id}",
            put(routes::announcements::update_announcement)
                .delete(routes::announcements::delete_announcement),
        )
        .route(
            "/announcements/{id}/status",
            put(routes::announcements::set_announcement_status),
        )
        // Maintenance gate
        .route(
            "/maintenance",
            get(routes::maintenance::get_maintenance)
                .put(routes::maintenance::replace_maintenance),
        )
        // Dashboard
        .route("/stats", get(routes::stats::dashboard_stats))
        // Live feed
        .route("/ws", get(routes::websocket::ws_handler))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("jinro admin API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
