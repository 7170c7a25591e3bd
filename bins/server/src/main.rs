//! Leafpress API Server
//!
//! Main entry point for the Leafpress media service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leafpress_api::{AppState, create_router};
use leafpress_core::capability::RoleCapabilities;
use leafpress_core::storage::{StorageBackend, StorageConfig, StorageService};
use leafpress_db::{SeaOrmMediaRepository, connect};
use leafpress_shared::{AppConfig, JwtConfig, JwtService};
use leafpress_shared::config::StorageSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leafpress=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create the storage service
    let backend = storage_backend(&config.storage);
    let storage = StorageService::from_config(StorageConfig::new(
        backend,
        config.storage.public_base_url.clone(),
    ))?;
    info!(backend = storage.backend_name(), "Storage configured");

    // Create JWT service
    let jwt_service = JwtService::new(JwtConfig {
        secret: config.auth.jwt_secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        token_expiry_secs: config.auth.token_expiry_secs as i64,
    });

    // Create application state
    let state = AppState {
        media: Arc::new(SeaOrmMediaRepository::new(db)),
        storage: Arc::new(storage),
        jwt_service: Arc::new(jwt_service),
        capabilities: Arc::new(RoleCapabilities),
        site_base_url: config.site.base_url.clone(),
        max_upload_bytes: config.storage.max_upload_bytes,
    };

    // Create router; the fs backend also serves stored files directly
    let mut app = create_router(state);
    if config.storage.backend == "fs" {
        app = app.nest_service("/files", ServeDir::new(&config.storage.root));
    }

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the storage backend from settings.
fn storage_backend(settings: &StorageSettings) -> StorageBackend {
    match settings.backend.as_str() {
        "s3" => StorageBackend::s3(
            settings.endpoint.clone(),
            settings.bucket.clone(),
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            settings.region.clone(),
        ),
        "azblob" => StorageBackend::azure_blob(
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            settings.bucket.clone(),
        ),
        "memory" => StorageBackend::Memory,
        _ => StorageBackend::local_fs(settings.root.clone()),
    }
}
