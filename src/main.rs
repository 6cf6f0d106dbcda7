//! HBnB Server - rental listings REST API

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hbnb_server::{
    api,
    config::{AppConfig, StorageBackend},
    repository::Repositories,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.default_log_filter().into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting HBnB Server v{}", env!("CARGO_PKG_VERSION"));

    let repos = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            Repositories::in_memory()
        }
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;

            tracing::info!("Database migrations completed");
            Repositories::postgres(pool)
        }
    };

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = AppState::new(config, repos);
    state.services.auth.bootstrap_admin().await?;

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
