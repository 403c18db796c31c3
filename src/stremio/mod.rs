//! Stremio add-on protocol types
//!
//! Response envelopes and resource shapes served to Stremio clients, plus
//! parsing of the `extra` path segment used by catalog requests.

mod manifest;

pub use manifest::{Manifest, ManifestInfo};

use serde::Serialize;

/// Prefix of every meta and stream id issued by this add-on
pub const ID_PREFIX: &str = "tb";

/// Descriptive record of one movie
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieMeta {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub poster_shape: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_info: Option<String>,
}

/// A playable torrent
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub name: String,
    pub title: String,
    pub info_hash: String,
}

/// `{"metas": [...]}`
#[derive(Debug, Default, Serialize)]
pub struct CatalogResponse {
    pub metas: Vec<MovieMeta>,
}

/// `{"meta": {...}}`, or `{}` when the movie is unknown
#[derive(Debug, Default, Serialize)]
pub struct MetaResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<MovieMeta>,
}

/// `{"streams": [...]}`
#[derive(Debug, Default, Serialize)]
pub struct StreamsResponse {
    pub streams: Vec<Stream>,
}

/// Turn a public id such as `tb42` into a storage row id
pub fn parse_movie_id(id: &str) -> Option<i64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

pub fn movie_id(row_id: i64) -> String {
    format!("{}{}", ID_PREFIX, row_id)
}

/// Extra arguments of a catalog request, e.g. `skip=25.json`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CatalogExtra {
    pub skip: u64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtraError {
    #[error("resource must end with .json")]
    MissingJsonSuffix,

    #[error("invalid skip value: {0}")]
    InvalidSkip(String),
}

impl CatalogExtra {
    /// Parse a `key=value&key=value.json` segment. Unknown keys are ignored.
    pub fn parse(segment: &str) -> Result<Self, ExtraError> {
        let args = segment
            .strip_suffix(".json")
            .ok_or(ExtraError::MissingJsonSuffix)?;

        let mut extra = CatalogExtra::default();
        for (key, value) in url::form_urlencoded::parse(args.as_bytes()) {
            if key == "skip" {
                extra.skip = value
                    .parse()
                    .map_err(|_| ExtraError::InvalidSkip(value.to_string()))?;
            }
        }

        Ok(extra)
    }
}

/// Strip the `.json` suffix from a resource id path segment
pub fn resource_id(segment: &str) -> Option<&str> {
    segment.strip_suffix(".json").filter(|id| !id.is_empty())
}
