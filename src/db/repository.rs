//! Typed access to scraped movies and their streams

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use super::Database;

/// A movie discovered on the source site
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub catalog: String,
    pub name: String,
    pub year: Option<i32>,
    pub poster: Option<String>,
    pub source_url: Option<String>,
}

/// A torrent belonging to a movie
#[derive(Debug, Clone)]
pub struct NewStream {
    pub info_hash: String,
    pub title: String,
    pub resolution: Option<String>,
    pub size: Option<u64>,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub id: i64,
    pub catalog: String,
    pub name: String,
    pub year: Option<i32>,
    pub poster: Option<String>,
    pub source_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    pub id: i64,
    pub movie_id: i64,
    pub info_hash: String,
    pub title: String,
    pub resolution: Option<String>,
    pub size: Option<u64>,
}

/// Row counts for the whole store
#[derive(Debug, Default, Serialize)]
pub struct StoreStats {
    pub movies: i64,
    pub streams: i64,
}

#[derive(Clone)]
pub struct MovieRepository {
    db: Database,
}

impl MovieRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a movie or refresh the existing row with the same catalog, name and year.
    ///
    /// Names compare case-insensitively. A refresh only fills a poster or source URL
    /// the row does not have yet.
    pub fn upsert_movie(&self, movie: &NewMovie) -> Result<i64> {
        let conn = self.db.conn();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM movies
                 WHERE catalog = ?1 AND name = ?2 COLLATE NOCASE AND year IS ?3
                 LIMIT 1",
                params![movie.catalog, movie.name, movie.year],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            conn.execute(
                "UPDATE movies SET
                    poster = COALESCE(poster, ?2),
                    source_url = COALESCE(source_url, ?3),
                    updated_at = ?4
                 WHERE id = ?1",
                params![id, movie.poster, movie.source_url, now],
            )?;
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO movies (catalog, name, year, poster, source_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                movie.catalog,
                movie.name,
                movie.year,
                movie.poster,
                movie.source_url,
                now,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Attach a stream to a movie. Returns false when the movie already has this info hash.
    pub fn add_stream(&self, movie_id: i64, stream: &NewStream) -> Result<bool> {
        let conn = self.db.conn();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO streams (movie_id, info_hash, title, resolution, size, source_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                movie_id,
                stream.info_hash.to_lowercase(),
                stream.title,
                stream.resolution,
                stream.size.map(|s| s as i64),
                stream.source_url,
                Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;

        Ok(inserted > 0)
    }

    /// Newest movies of a catalog first
    pub fn list_by_catalog(&self, catalog: &str, skip: u64, limit: u32) -> Result<Vec<MovieRecord>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, catalog, name, year, poster, source_url, created_at
             FROM movies
             WHERE catalog = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3",
        )?;

        let offset = i64::try_from(skip).unwrap_or(i64::MAX);
        let movies = stmt
            .query_map(params![catalog, limit, offset], movie_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(movies)
    }

    pub fn find_movie(&self, id: i64) -> Result<Option<MovieRecord>> {
        let conn = self.db.conn();
        let movie = conn
            .query_row(
                "SELECT id, catalog, name, year, poster, source_url, created_at
                 FROM movies WHERE id = ?1",
                [id],
                movie_from_row,
            )
            .optional()?;

        Ok(movie)
    }

    /// Streams of a movie in the order they were discovered
    pub fn list_streams(&self, movie_id: i64) -> Result<Vec<StreamRecord>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, movie_id, info_hash, title, resolution, size
             FROM streams WHERE movie_id = ?1 ORDER BY id",
        )?;

        let streams = stmt
            .query_map([movie_id], |row| {
                Ok(StreamRecord {
                    id: row.get(0)?,
                    movie_id: row.get(1)?,
                    info_hash: row.get(2)?,
                    title: row.get(3)?,
                    resolution: row.get(4)?,
                    size: row.get::<_, Option<i64>>(5)?.map(|s| s as u64),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(streams)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.db.conn();
        let movies = conn.query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))?;
        let streams = conn.query_row("SELECT COUNT(*) FROM streams", [], |row| row.get(0))?;
        Ok(StoreStats { movies, streams })
    }
}

fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<MovieRecord> {
    Ok(MovieRecord {
        id: row.get(0)?,
        catalog: row.get(1)?,
        name: row.get(2)?,
        year: row.get(3)?,
        poster: row.get(4)?,
        source_url: row.get(5)?,
        created_at: row.get(6)?,
    })
}
