//! TamilBlasters - a Stremio add-on for South Indian movie torrents
//!
//! Movies are scraped from the TamilBlasters forum into a local catalog and
//! served to Stremio clients as catalogs, metadata and torrent streams.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod db;
mod service;
mod site;
mod stremio;
mod utils;

use api::AppState;
use config::Settings;
use db::{Database, MovieRepository};
use service::{ScrapeQueue, TamilBlastersScraper};
use site::SiteClient;
use stremio::Manifest;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tamilblasters=info,tower_http=info".into()),
        )
        .init();

    info!("Starting TamilBlasters v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let settings = Settings::load()?;
    info!("Configuration loaded from {:?}", settings.config_path());

    let manifest = Manifest::load(&settings.addon.manifest_path)?;
    info!(
        "Manifest {} v{} with {} catalogs",
        manifest.info().name,
        manifest.info().version,
        manifest.info().catalogs.len()
    );

    // Initialize database
    let db = Database::new(&settings.database.path)?;
    db.migrate()?;
    info!("Database initialized at {:?}", settings.database.path);
    let repo = MovieRepository::new(db);

    // Background scraping
    let scraper = TamilBlastersScraper::new(
        SiteClient::new(&settings.scraper)?,
        repo.clone(),
        Duration::from_millis(settings.scraper.request_interval_ms),
    );
    let queue = ScrapeQueue::spawn(
        Arc::new(scraper),
        settings.scraper.queue_capacity,
        settings.scraper.max_concurrent_jobs,
    );
    let _scheduler = service::start_scheduler(queue.clone(), &settings.scraper.schedules).await?;

    let state = AppState::new(manifest, repo, queue, settings.addon.catalog_page_size);
    let app = api::create_router(state);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
