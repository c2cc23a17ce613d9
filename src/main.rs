use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ados::config::CONFIG;
use ados::db;
use ados::endpoints::create_app;
use ados::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("ados={},tower_http=debug", CONFIG.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if CONFIG.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting ADOS backend v{}", CONFIG.version);

    // Connect and migrate
    let db = db::connect().await?;
    tracing::info!("Database connection established");

    let state = AppState::new(db);
    let channels = state.notification.channels();
    tracing::info!("Notification channels: {:?}", channels);

    let app = create_app(state);

    // Determine bind address
    let addr: SocketAddr = format!("{}:{}", CONFIG.server.host, CONFIG.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}", CONFIG.server.host))?;
    tracing::info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
