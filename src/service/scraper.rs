//! Scraper service
//!
//! Crawls forum listing pages (or the home page), opens every topic, and
//! stores the movie with one stream per torrent found in the first post.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::db::{MovieRepository, NewMovie, NewStream};
use crate::site::{
    self, catalog_id, forum_page_url, forum_slug, parser, title, torrent, Language, SiteClient,
    VideoType,
};

/// One background scrape, as submitted by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_video_type")]
    pub video_type: String,

    /// Number of listing pages to crawl
    #[serde(default = "default_pages")]
    pub pages: u32,

    #[serde(default = "default_start_page")]
    pub start_page: u32,

    /// Crawl the home page instead of a forum section
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_scrape_home: bool,
}

fn default_language() -> String {
    "tamil".to_string()
}

fn default_video_type() -> String {
    "hdrip".to_string()
}

fn default_pages() -> u32 {
    1
}

fn default_start_page() -> u32 {
    1
}

/// Accept booleans as well as `1`/`0`, `yes`/`no`, `on`/`off` in any case
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;

    match value {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => match n.as_u64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err(D::Error::custom(format!("invalid flag: {}", n))),
        },
        serde_json::Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(D::Error::custom(format!("invalid flag: {}", s))),
        },
        _ => Err(D::Error::custom("expected a boolean flag")),
    }
}

impl Default for ScrapeRequest {
    fn default() -> Self {
        Self {
            language: default_language(),
            video_type: default_video_type(),
            pages: default_pages(),
            start_page: default_start_page(),
            is_scrape_home: false,
        }
    }
}

/// Counters for one finished scrape
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeSummary {
    pub pages: usize,
    pub topics: usize,
    pub movies: usize,
    pub streams: usize,
    pub failed: usize,
}

/// Something that can carry out a scrape request
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn run(&self, request: ScrapeRequest) -> Result<ScrapeSummary>;
}

/// Where a topic's movie should be filed
#[derive(Debug, Clone)]
enum CatalogTarget {
    /// Forum sections hold one catalog
    Fixed(String),
    /// Home page topics are classified by title, falling back to the request
    FromTitle(Option<(Language, VideoType)>),
}

pub struct TamilBlastersScraper {
    site: SiteClient,
    repo: MovieRepository,
    request_interval: Duration,
}

impl TamilBlastersScraper {
    pub fn new(site: SiteClient, repo: MovieRepository, request_interval: Duration) -> Self {
        Self {
            site,
            repo,
            request_interval,
        }
    }

    async fn scrape_home(&self, request: &ScrapeRequest, summary: &mut ScrapeSummary) -> Result<()> {
        let fallback = request
            .language
            .parse::<Language>()
            .ok()
            .zip(request.video_type.parse::<VideoType>().ok());

        let html = self
            .fetch_text(self.site.base_url())
            .await
            .context("Failed to fetch home page")?;
        summary.pages += 1;

        let topics = parser::parse_topic_links(&html);
        info!("Found {} topics on home page", topics.len());

        for topic_url in topics {
            self.scrape_topic(&topic_url, &CatalogTarget::FromTitle(fallback), summary)
                .await;
        }

        Ok(())
    }

    async fn scrape_forum(&self, request: &ScrapeRequest, summary: &mut ScrapeSummary) -> Result<()> {
        let language: Language = request.language.parse()?;
        let video_type: VideoType = request.video_type.parse()?;
        let slug = forum_slug(language, video_type).ok_or_else(|| {
            anyhow!("The site has no {} forum for {}", video_type, language)
        })?;
        let target = CatalogTarget::Fixed(catalog_id(language, video_type));

        let end_page = request.start_page.saturating_add(request.pages);
        for page in request.start_page..end_page {
            let url = forum_page_url(self.site.base_url(), slug, page);
            let html = match self.fetch_text(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to fetch forum page {}: {}", url, e);
                    summary.failed += 1;
                    continue;
                }
            };
            summary.pages += 1;

            let topics = parser::parse_topic_links(&html);
            debug!("Forum page {} lists {} topics", page, topics.len());

            for topic_url in topics {
                self.scrape_topic(&topic_url, &target, summary).await;
            }
        }

        Ok(())
    }

    /// Scrape one topic, recording the outcome in the summary
    async fn scrape_topic(&self, href: &str, target: &CatalogTarget, summary: &mut ScrapeSummary) {
        summary.topics += 1;
        let url = self.site.absolute_url(href);

        match self.store_topic(&url, target).await {
            Ok(new_streams) => {
                summary.movies += 1;
                summary.streams += new_streams;
            }
            Err(e) => {
                warn!("Skipping topic {}: {:#}", url, e);
                summary.failed += 1;
            }
        }
    }

    /// Returns the number of streams that were new
    async fn store_topic(&self, url: &str, target: &CatalogTarget) -> Result<usize> {
        let html = self.fetch_text(url).await?;
        let topic = parser::parse_topic(&html);

        let release = title::parse_release_title(&topic.title);
        if release.name.is_empty() {
            bail!("topic has no title");
        }

        let catalog = match target {
            CatalogTarget::Fixed(catalog) => catalog.clone(),
            CatalogTarget::FromTitle(fallback) => title::classify_title(&topic.title)
                .or(*fallback)
                .map(|(language, video_type)| catalog_id(language, video_type))
                .ok_or_else(|| anyhow!("cannot tell the catalog of {:?}", topic.title))?,
        };

        let mut streams = Vec::new();

        for attachment in &topic.attachments {
            let attachment_url = self.site.absolute_url(&attachment.url);
            match self.fetch_torrent(&attachment_url).await {
                Ok(info) => {
                    let mut stream_title = title::clean_attachment_name(&attachment.name);
                    if stream_title.is_empty() {
                        stream_title = info.name.unwrap_or_else(|| topic.title.clone());
                    }
                    streams.push(NewStream {
                        info_hash: info.info_hash,
                        resolution: title::detect_resolution(&stream_title),
                        size: info.size,
                        title: stream_title,
                        source_url: Some(attachment_url),
                    });
                }
                Err(e) => warn!("Failed to read torrent {}: {}", attachment_url, e),
            }
        }

        for magnet in &topic.magnets {
            match torrent::parse_magnet(magnet) {
                Ok(info) => {
                    let stream_title = info.name.unwrap_or_else(|| topic.title.clone());
                    streams.push(NewStream {
                        info_hash: info.info_hash,
                        resolution: title::detect_resolution(&stream_title),
                        size: info.size.or_else(|| title::detect_size(&stream_title)),
                        title: stream_title,
                        source_url: Some(url.to_string()),
                    });
                }
                Err(e) => warn!("Ignoring magnet in {}: {}", url, e),
            }
        }

        if streams.is_empty() {
            bail!("no torrents found");
        }

        let movie_id = self.repo.upsert_movie(&NewMovie {
            catalog,
            name: release.name,
            year: release.year,
            poster: topic.poster.map(|p| self.site.absolute_url(&p)),
            source_url: Some(url.to_string()),
        })?;

        let mut added = 0;
        for stream in &streams {
            if self.repo.add_stream(movie_id, stream)? {
                added += 1;
            }
        }

        Ok(added)
    }

    async fn fetch_text(&self, url: &str) -> site::Result<String> {
        let result = self.site.get_text(url).await;
        tokio::time::sleep(self.request_interval).await;
        result
    }

    async fn fetch_torrent(&self, url: &str) -> site::Result<torrent::TorrentInfo> {
        let bytes = self.site.get_bytes(url).await;
        tokio::time::sleep(self.request_interval).await;
        torrent::parse_torrent_file(&bytes?)
    }
}

#[async_trait]
impl Scraper for TamilBlastersScraper {
    async fn run(&self, request: ScrapeRequest) -> Result<ScrapeSummary> {
        let mut summary = ScrapeSummary::default();

        if request.is_scrape_home {
            self.scrape_home(&request, &mut summary).await?;
        } else {
            self.scrape_forum(&request, &mut summary).await?;
        }

        Ok(summary)
    }
}
