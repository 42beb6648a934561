//! Quote Sync - local service behind the quote generator UI.

use std::sync::Arc;

use quotesync_service::config::Config;
use quotesync_service::db::{self, SqliteKv};
use quotesync_service::remote::HttpRemote;
use quotesync_service::store::LocalStore;
use quotesync_service::sync::{SyncOrchestrator, SyncScheduler};
use quotesync_service::websocket::ConnectionManager;
use quotesync_service::{build_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotesync_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Quote Sync on {}:{}", config.host, config.port);

    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    let store = LocalStore::new(SqliteKv::new(pool));
    let remote = HttpRemote::new(&config.remote_url, config.fetch_timeout)?;

    let conn_manager = ConnectionManager::new_shared();
    let orchestrator = Arc::new(
        SyncOrchestrator::open(store, remote)
            .await
            .with_listener(conn_manager.clone()),
    );

    let mut scheduler = SyncScheduler::new(config.sync_interval, config.auto_sync);
    scheduler.start(Arc::clone(&orchestrator));

    let state = AppState {
        orchestrator,
        scheduler: Arc::new(scheduler),
        config: Arc::new(config.clone()),
        conn_manager,
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
