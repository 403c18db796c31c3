//! Stremio add-on resource handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::api::{AppError, AppState};
use crate::stremio::{self, CatalogExtra, CatalogResponse, MetaResponse, StreamsResponse};

/// Serve the manifest document exactly as loaded
pub async fn manifest(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.manifest.raw(),
    )
}

/// `/catalog/movie/{catalog_id}.json`
pub async fn catalog(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<CatalogResponse>, AppError> {
    let catalog_id = resource_id(&segment)?;
    catalog_page(&state, catalog_id, &CatalogExtra::default())
}

/// `/catalog/movie/{catalog_id}/skip={skip}.json`
pub async fn catalog_with_extra(
    State(state): State<AppState>,
    Path((catalog_id, extra)): Path<(String, String)>,
) -> Result<Json<CatalogResponse>, AppError> {
    let extra = CatalogExtra::parse(&extra)?;
    catalog_page(&state, &catalog_id, &extra)
}

fn catalog_page(
    state: &AppState,
    catalog_id: &str,
    extra: &CatalogExtra,
) -> Result<Json<CatalogResponse>, AppError> {
    let metas = state.catalog.get_movies_meta(catalog_id, extra.skip)?;
    Ok(Json(CatalogResponse { metas }))
}

pub async fn meta(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<MetaResponse>, AppError> {
    let meta_id = resource_id(&segment)?;
    Ok(Json(state.catalog.get_movie_meta(meta_id)?))
}

pub async fn streams(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<StreamsResponse>, AppError> {
    let video_id = resource_id(&segment)?;
    let streams = state.catalog.get_movie_streams(video_id)?;
    Ok(Json(StreamsResponse { streams }))
}

fn resource_id(segment: &str) -> Result<&str, AppError> {
    stremio::resource_id(segment).ok_or_else(|| AppError::not_found("Not Found"))
}
