//! Hospital Pharmacy Inventory - Backend Server
//!
//! Lot-level stock control for a hospital pharmacy with FEFO dispensing and
//! full movement traceability.

use std::{net::SocketAddr, sync::Arc};

use pharmacy_inventory::{
    config::{Config, StorageBackend},
    create_app, seed,
    store::{InventoryStore, MemoryStore, PgStore},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    init_tracing(&config.log_format);

    tracing::info!("Starting Hospital Pharmacy Inventory Server");
    tracing::info!("Environment: {}", config.environment);

    let store: Arc<dyn InventoryStore> = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let store = PgStore::connect(&config.database).await?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            store.migrate().await?;
            tracing::info!("Migrations completed");
            Arc::new(store)
        }
    };

    if config.seed_demo_data {
        seed::seed_demo_catalog(store.as_ref()).await?;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Build application
    let state = AppState::new(store, config);
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(log_format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "pharmacy_inventory=debug,pharmacy_server=debug,tower_http=debug,sqlx=warn".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
