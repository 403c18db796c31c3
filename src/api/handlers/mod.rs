//! API request handlers

pub mod addon;
pub mod scraper;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use regex::{Captures, Regex};
use rust_embed::Embed;
use serde_json::json;
use std::sync::LazyLock;

use super::{AppError, AppState, StaticAssets};
use crate::stremio::ManifestInfo;
use crate::utils::escape_html;

const HOME_TEMPLATE: &str = include_str!("../../../resources/home.html");

// `{{ key }}` placeholders in the home page template
static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{ (\w+) \}\}").expect("static regex must compile"));

const LOGO_PATH: &str = "static/tamilblasters.png";

const GENRES: [&str; 7] = [
    "Tamil Movies",
    "Malayalam Movies",
    "Telugu Movies",
    "Hindi Movies",
    "Kannada Movies",
    "English Movies",
    "Dubbed Movies",
];

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let store = state.repo.stats()?;

    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "store": store,
    })))
}

/// Landing page with install instructions
pub async fn home(State(state): State<AppState>) -> Html<String> {
    Html(render_home(state.manifest.info()))
}

fn render_home(info: &ManifestInfo) -> String {
    let gives = GENRES
        .iter()
        .map(|genre| format!("<li>{}</li>", escape_html(genre)))
        .collect::<Vec<_>>()
        .join("\n");

    // One pass, so substituted values are never expanded again
    RE_PLACEHOLDER
        .replace_all(HOME_TEMPLATE, |caps: &Captures<'_>| match &caps[1] {
            "name" => escape_html(&info.name),
            "version" => escape_html(&info.version),
            "description" => escape_html(&info.description),
            "logo" => LOGO_PATH.to_string(),
            "gives" => gives.clone(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// Embedded asset under `/static`
pub async fn static_handler(Path(path): Path<String>) -> Response {
    match <StaticAssets as Embed>::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
