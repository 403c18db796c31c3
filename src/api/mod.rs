//! HTTP API layer

mod error;
pub mod handlers;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use rust_embed::RustEmbed;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::db::MovieRepository;
use crate::service::{CatalogService, ScrapeQueue};
use crate::stremio::Manifest;

pub use error::AppError;

/// Embedded page assets (logo, home page template)
#[derive(RustEmbed)]
#[folder = "resources"]
struct StaticAssets;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub manifest: Arc<Manifest>,
    pub repo: MovieRepository,
    pub catalog: Arc<CatalogService>,
    pub queue: ScrapeQueue,
}

impl AppState {
    pub fn new(manifest: Manifest, repo: MovieRepository, queue: ScrapeQueue, page_size: u32) -> Self {
        let catalog = Arc::new(CatalogService::new(repo.clone(), page_size));

        Self {
            manifest: Arc::new(manifest),
            repo,
            catalog,
            queue,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    // Stremio clients fetch these cross-origin
    let addon_routes = Router::new()
        .route("/manifest.json", get(handlers::addon::manifest))
        .route("/catalog/movie/{catalog_id}", get(handlers::addon::catalog))
        .route(
            "/catalog/movie/{catalog_id}/{extra}",
            get(handlers::addon::catalog_with_extra),
        )
        .route("/meta/movie/{meta_id}", get(handlers::addon::meta))
        .route("/stream/movie/{video_id}", get(handlers::addon::streams))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("*"),
        ));

    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/scraper", post(handlers::scraper::submit))
        .route("/static/{*path}", get(handlers::static_handler))
        .merge(addon_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
