//! Catalog service
//!
//! Answers catalog, meta and stream requests from the movie store.

use anyhow::Result;

use crate::db::{MovieRecord, MovieRepository, StreamRecord};
use crate::stremio::{self, MetaResponse, MovieMeta, Stream};
use crate::utils::format_size;

const STREAM_SOURCE: &str = "TamilBlasters";

pub struct CatalogService {
    repo: MovieRepository,
    page_size: u32,
}

impl CatalogService {
    pub fn new(repo: MovieRepository, page_size: u32) -> Self {
        Self { repo, page_size }
    }

    /// One page of a catalog, newest first. Unknown catalogs are empty.
    pub fn get_movies_meta(&self, catalog_id: &str, skip: u64) -> Result<Vec<MovieMeta>> {
        let movies = self.repo.list_by_catalog(catalog_id, skip, self.page_size)?;
        Ok(movies.iter().map(to_meta).collect())
    }

    pub fn get_movie_meta(&self, meta_id: &str) -> Result<MetaResponse> {
        let Some(row_id) = stremio::parse_movie_id(meta_id) else {
            return Ok(MetaResponse::default());
        };

        let meta = self.repo.find_movie(row_id)?.map(|movie| to_meta(&movie));
        Ok(MetaResponse { meta })
    }

    pub fn get_movie_streams(&self, video_id: &str) -> Result<Vec<Stream>> {
        let Some(row_id) = stremio::parse_movie_id(video_id) else {
            return Ok(Vec::new());
        };

        let streams = self.repo.list_streams(row_id)?;
        Ok(streams.iter().map(to_stream).collect())
    }
}

fn to_meta(movie: &MovieRecord) -> MovieMeta {
    MovieMeta {
        id: stremio::movie_id(movie.id),
        content_type: "movie",
        name: movie.name.clone(),
        poster: movie.poster.clone(),
        poster_shape: "poster",
        background: movie.poster.clone(),
        release_info: movie.year.map(|y| y.to_string()),
    }
}

fn to_stream(stream: &StreamRecord) -> Stream {
    let name = match &stream.resolution {
        Some(resolution) => format!("{}\n{}", STREAM_SOURCE, resolution),
        None => STREAM_SOURCE.to_string(),
    };
    let title = match stream.size {
        Some(size) => format!("{}\n{}", stream.title, format_size(size)),
        None => stream.title.clone(),
    };

    Stream {
        name,
        title,
        info_hash: stream.info_hash.clone(),
    }
}
