//! Configuration management module

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::service::ScrapeRequest;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub addon: AddonSettings,

    #[serde(default)]
    pub scraper: ScraperSettings,

    #[serde(skip)]
    config_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonSettings {
    /// Add-on manifest served at /manifest.json
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// Number of movies returned per catalog request
    #[serde(default = "default_page_size")]
    pub catalog_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperSettings {
    /// Root URL of the forum being crawled
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Delay between requests to the site in milliseconds
    #[serde(default = "default_request_interval")]
    pub request_interval_ms: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Pending scrape requests held before new submissions are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Scrape jobs allowed to run at the same time
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_jobs: usize,

    #[serde(default)]
    pub schedules: Vec<ScheduledScrape>,
}

/// A scrape submitted on a cron schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledScrape {
    /// Six-field cron expression (sec min hour day month weekday)
    pub cron: String,

    #[serde(flatten)]
    pub request: ScrapeRequest,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/tamilblasters.db")
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("manifest.json")
}

fn default_page_size() -> u32 {
    25
}

fn default_base_url() -> String {
    "https://www.1tamilblasters.net".to_string()
}

fn default_request_interval() -> u64 {
    500
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("Mozilla/5.0 (compatible; TamilBlastersAddon/", env!("CARGO_PKG_VERSION"), ")").to_string()
}

fn default_queue_capacity() -> usize {
    16
}

fn default_max_concurrent() -> usize {
    1
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for AddonSettings {
    fn default() -> Self {
        Self {
            manifest_path: default_manifest_path(),
            catalog_page_size: default_page_size(),
        }
    }
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_interval_ms: default_request_interval(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            queue_capacity: default_queue_capacity(),
            max_concurrent_jobs: default_max_concurrent(),
            schedules: Vec::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            addon: AddonSettings::default(),
            scraper: ScraperSettings::default(),
            config_file: None,
        }
    }
}

impl Settings {
    /// Load settings from environment and config file
    pub fn load() -> Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut config_paths = vec![
            PathBuf::from("config.toml"),
            PathBuf::from("./data/config.toml"),
        ];
        if let Some(path) = dirs_config_path() {
            config_paths.push(path);
        }

        let mut settings = Settings::default();

        for path in config_paths.iter() {
            if path.exists() {
                settings = Self::load_from_file(path)?;
                settings.config_file = Some(path.clone());
                break;
            }
        }

        settings.apply_env_overrides();

        // Ensure data directory exists
        if let Some(parent) = settings.database.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create data directory")?;
        }

        Ok(settings)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("TAMILBLASTERS_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TAMILBLASTERS_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(path) = std::env::var("TAMILBLASTERS_DATA_DIR") {
            self.database.path = PathBuf::from(path).join("tamilblasters.db");
        }
        if let Ok(path) = std::env::var("TAMILBLASTERS_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("TAMILBLASTERS_MANIFEST") {
            self.addon.manifest_path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("TAMILBLASTERS_BASE_URL") {
            self.scraper.base_url = url;
        }
    }

    /// Get the path to the config file (if loaded from file)
    pub fn config_path(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }
}

/// Get platform-specific config directory
fn dirs_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
            .map(|p| p.join("tamilblasters/config.toml"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/tamilblasters/config.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("tamilblasters/config.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.addon.catalog_page_size, 25);
        assert_eq!(settings.addon.manifest_path, PathBuf::from("manifest.json"));
        assert_eq!(settings.scraper.max_concurrent_jobs, 1);
        assert!(settings.scraper.schedules.is_empty());
    }

    #[test]
    fn test_parse_schedules() {
        let settings = Settings::from_toml(
            r#"
            [server]
            port = 7000

            [scraper]
            base_url = "http://localhost:9000"

            [[scraper.schedules]]
            cron = "0 0 */6 * * *"
            is_scrape_home = true

            [[scraper.schedules]]
            cron = "0 30 1 * * *"
            language = "malayalam"
            video_type = "tcrip"
            pages = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 7000);
        assert_eq!(settings.scraper.base_url, "http://localhost:9000");
        assert_eq!(settings.scraper.schedules.len(), 2);

        let home = &settings.scraper.schedules[0].request;
        assert!(home.is_scrape_home);
        assert_eq!(home.language, "tamil");
        assert_eq!(home.pages, 1);

        let forum = &settings.scraper.schedules[1].request;
        assert_eq!(forum.language, "malayalam");
        assert_eq!(forum.video_type, "tcrip");
        assert_eq!(forum.pages, 3);
        assert_eq!(forum.start_page, 1);
    }
}
