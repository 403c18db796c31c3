//! Scraper trigger

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::json;
use tracing::info;

use crate::api::AppState;
use crate::service::ScrapeRequest;

/// Queue a scrape and answer without waiting for it
pub async fn submit(
    State(state): State<AppState>,
    Query(request): Query<ScrapeRequest>,
) -> Json<serde_json::Value> {
    info!("Scrape requested: {:?}", request);
    state.queue.submit(request);

    Json(json!({
        "message": "Scraping in background...",
    }))
}
