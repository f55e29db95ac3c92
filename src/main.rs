use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use quickpass_server::config::{Config, StorageBackend};
use quickpass_server::routes::create_routes;
use quickpass_server::state::AppState;
use quickpass_server::store::{MemoryStore, PgStore, SharedStore};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quickpass_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let store: SharedStore = match config.storage {
        StorageBackend::Postgres => {
            let store = PgStore::connect(&config.database_url, config.max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Successfully connected to database");

            store.migrate().await.expect("Failed to run migrations");
            tracing::info!("Migrations run successfully");

            Arc::new(store)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let app: Router = create_routes(AppState::new(store), &config);

    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
