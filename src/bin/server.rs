//! mentorkit HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT`: HTTP port (default: 8080)
//! - `MENTOR_CATALOG`: JSON/YAML catalog override (default: embedded catalog)
//! - `MENTOR_STORE`: `memory` (default) or a SQLite file path
//! - `MENTOR_GENERATION_API_KEY`: enables `POST /generate` when set
//! - `MENTOR_GENERATION_URL`, `MENTOR_GENERATION_MODEL`,
//!   `MENTOR_GENERATION_TIMEOUT_SECS`, `MENTOR_GENERATION_MAX_RETRIES`
//! - `RUST_LOG`: Tracing filter (default: "info,mentorkit=debug")
//!
//! # Usage
//!
//! ```bash
//! MENTOR_STORE=./data/content.db cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;

use mentorkit::catalog::MentorCatalog;
use mentorkit::generation::{ContentService, HttpContentGenerator};
use mentorkit::server::{app_router, AppState};
use mentorkit::store::{ContentStore, InMemoryContentStore, SqliteContentStore};
use mentorkit::utilities::{MentorConfig, StoreLocation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mentorkit=debug".into()),
        )
        .init();

    let config = MentorConfig::from_env();

    let catalog = match &config.catalog_path {
        Some(path) => {
            tracing::info!("Loading catalog from {}", path.display());
            MentorCatalog::from_path(path)
                .with_context(|| format!("failed to load catalog {}", path.display()))?
        }
        None => MentorCatalog::embedded().context("embedded catalog is invalid")?,
    };
    let catalog = Arc::new(catalog);
    tracing::info!(
        characters = catalog.characters.len(),
        tones = catalog.tones.len(),
        "Catalog loaded"
    );

    let store: Arc<dyn ContentStore> = match &config.store {
        StoreLocation::Memory => {
            tracing::info!("Using in-memory content store");
            Arc::new(InMemoryContentStore::new())
        }
        StoreLocation::Sqlite(path) => {
            tracing::info!("Using SQLite content store at {}", path.display());
            Arc::new(
                SqliteContentStore::open(path)
                    .with_context(|| format!("failed to open store {}", path.display()))?,
            )
        }
    };

    let mut state = AppState::new(catalog.clone(), store.clone());
    if config.generation_enabled() {
        let generator = HttpContentGenerator::new(
            config.generation_url.clone(),
            config.generation_api_key.clone(),
        )
        .with_timeout(config.generation_timeout)
        .with_max_retries(config.generation_max_retries)
        .with_app_title("mentorkit");
        tracing::info!(
            endpoint = %config.generation_url,
            model = %config.generation_model,
            "Content generation enabled (API key present)"
        );
        let service = ContentService::new(
            catalog,
            Arc::new(generator),
            store,
            config.generation_model.clone(),
        );
        state = state.with_content_service(Arc::new(service));
    } else {
        tracing::warn!("MENTOR_GENERATION_API_KEY not set, POST /generate will answer 503");
    }

    let app = app_router(state);
    let bind_addr = format!("0.0.0.0:{}", config.port);

    tracing::info!("mentorkit server starting on {}", bind_addr);
    tracing::info!("  GET  /health   : liveness probe");
    tracing::info!("  POST /format   : template formatting");
    tracing::info!("  POST /generate : character content generation");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
