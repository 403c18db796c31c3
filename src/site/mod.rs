//! Source site module
//!
//! This module knows how the TamilBlasters forum is laid out: which forum
//! section holds which catalog, how pages are addressed, and how topic pages
//! are parsed into movies and torrents.

mod client;
pub mod parser;
pub mod title;
pub mod torrent;

pub use client::SiteClient;

use serde::{Deserialize, Serialize};

/// Error type for site operations
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Invalid torrent file: {0}")]
    InvalidTorrent(String),

    #[error("Invalid magnet link: {0}")]
    InvalidMagnet(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Unknown video type: {0}")]
    UnknownVideoType(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;

/// Movie language, one forum group per language
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Tamil,
    Malayalam,
    Telugu,
    Hindi,
    Kannada,
    English,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Tamil,
        Language::Malayalam,
        Language::Telugu,
        Language::Hindi,
        Language::Kannada,
        Language::English,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Tamil => "tamil",
            Language::Malayalam => "malayalam",
            Language::Telugu => "telugu",
            Language::Hindi => "hindi",
            Language::Kannada => "kannada",
            Language::English => "english",
        }
    }

    /// Three-letter code used in multi-audio release names, e.g. `[Tam + Tel]`
    pub fn short_code(&self) -> &'static str {
        &self.as_str()[..3]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|l| l.as_str() == lower || l.short_code() == lower)
            .ok_or_else(|| SiteError::UnknownLanguage(s.to_string()))
    }
}

/// Release quality group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    /// HDRip, BDRip, WEB-DL and other retail-quality releases
    HdRip,
    /// Theatre captures: TC, HDCAM, PreDVD, DVDScr
    TcRip,
    Dubbed,
}

impl VideoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoType::HdRip => "hdrip",
            VideoType::TcRip => "tcrip",
            VideoType::Dubbed => "dubbed",
        }
    }
}

impl std::fmt::Display for VideoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VideoType {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hdrip" | "hd" => Ok(VideoType::HdRip),
            "tcrip" | "tc" => Ok(VideoType::TcRip),
            "dubbed" | "dub" => Ok(VideoType::Dubbed),
            _ => Err(SiteError::UnknownVideoType(s.to_string())),
        }
    }
}

/// Catalog id served to clients, e.g. `tamil_hdrip`
pub fn catalog_id(language: Language, video_type: VideoType) -> String {
    format!("{}_{}", language, video_type)
}

/// A forum section listing one catalog's topics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumSection {
    pub language: Language,
    pub video_type: VideoType,
    pub slug: &'static str,
}

/// Built-in forum sections
pub fn builtin_forums() -> Vec<ForumSection> {
    use Language::*;
    use VideoType::*;

    let table: [(Language, VideoType, &'static str); 17] = [
        (Tamil, HdRip, "7-tamil-new-movies-hdrips-bdrips-dvdrips-hdtv"),
        (Tamil, TcRip, "8-tamil-new-movies-tcrip-dvdscr-hdcam-predvd"),
        (Tamil, Dubbed, "9-tamil-dubbed-movies-bdrips-hdrips-dvdscr-hdcam-in-multi-audios"),
        (Malayalam, HdRip, "34-malayalam-new-movies-hdrips-bdrips-dvdrips-hdtv"),
        (Malayalam, TcRip, "35-malayalam-new-movies-tcrip-dvdscr-hdcam-predvd"),
        (Malayalam, Dubbed, "36-malayalam-dubbed-movies-bdrips-hdrips-dvdscr-hdcam"),
        (Telugu, HdRip, "24-telugu-new-movies-hdrips-bdrips-dvdrips-hdtv"),
        (Telugu, TcRip, "25-telugu-new-movies-tcrip-dvdscr-hdcam-predvd"),
        (Telugu, Dubbed, "26-telugu-dubbed-movies-bdrips-hdrips-dvdscr-hdcam"),
        (Hindi, HdRip, "56-hindi-new-movies-hdrips-bdrips-dvdrips-hdtv"),
        (Hindi, TcRip, "57-hindi-new-movies-tcrip-dvdscr-hdcam-predvd"),
        (Hindi, Dubbed, "58-hindi-dubbed-movies-bdrips-hdrips-dvdscr-hdcam"),
        (Kannada, HdRip, "70-kannada-new-movies-hdrips-bdrips-dvdrips-hdtv"),
        (Kannada, TcRip, "71-kannada-new-movies-tcrip-dvdscr-hdcam-predvd"),
        (Kannada, Dubbed, "72-kannada-dubbed-movies-bdrips-hdrips-dvdscr-hdcam"),
        (English, HdRip, "52-english-movies-hdrips-bdrips-dvdrips"),
        (English, TcRip, "53-english-movies-tcrip-dvdscr-hdcam"),
    ];

    table
        .into_iter()
        .map(|(language, video_type, slug)| ForumSection {
            language,
            video_type,
            slug,
        })
        .collect()
}

/// Forum slug for a catalog, if the site has one
pub fn forum_slug(language: Language, video_type: VideoType) -> Option<&'static str> {
    builtin_forums()
        .into_iter()
        .find(|f| f.language == language && f.video_type == video_type)
        .map(|f| f.slug)
}

/// URL of one listing page of a forum section (pages start at 1)
pub fn forum_page_url(base_url: &str, slug: &str, page: u32) -> String {
    format!(
        "{}/index.php?/forums/forum/{}/page/{}/",
        base_url.trim_end_matches('/'),
        slug,
        page
    )
}
