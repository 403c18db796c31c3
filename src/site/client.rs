use std::time::Duration;

use super::{Result, SiteError};
use crate::config::ScraperSettings;

/// HTTP access to the source site
#[derive(Clone)]
pub struct SiteClient {
    http: reqwest::Client,
    base_url: String,
}

impl SiteClient {
    pub fn new(settings: &ScraperSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a link found on a page against the site root
    pub fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with("//") {
            format!("https:{}", href)
        } else {
            format!("{}/{}", self.base_url, href.trim_start_matches('/'))
        }
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.send(url).await?;
        Ok(response.text().await?)
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.send(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .http
            .get(url)
            .header("Referer", self.base_url.as_str())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SiteError::BadStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}
