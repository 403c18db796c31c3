//! Add-on manifest
//!
//! The manifest document is read once at startup. Its bytes are served to
//! clients untouched, while a typed view feeds the home page.

use anyhow::{Context, Result};
use axum::body::Bytes;
use serde::Deserialize;
use std::path::Path;

/// Fields of the manifest this server relies on
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    #[serde(default)]
    pub catalogs: Vec<CatalogDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDescriptor {
    #[serde(rename = "type")]
    pub content_type: String,
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// The loaded manifest document
#[derive(Debug, Clone)]
pub struct Manifest {
    raw: Bytes,
    info: ManifestInfo,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("Failed to read manifest: {:?}", path))?;

        Self::from_bytes(raw).with_context(|| format!("Invalid manifest: {:?}", path))
    }

    pub fn from_bytes(raw: impl Into<Bytes>) -> Result<Self> {
        let raw = raw.into();
        let info: ManifestInfo = serde_json::from_slice(&raw)
            .context("Manifest must be a JSON object with name, version and description")?;

        Ok(Self { raw, info })
    }

    /// Document exactly as it was read
    pub fn raw(&self) -> Bytes {
        self.raw.clone()
    }

    pub fn info(&self) -> &ManifestInfo {
        &self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_raw_document() {
        let doc = r#"{"name":"TamilBlasters","version":"1.0.0","description":"x","extra":  [1, 2]}"#;
        let manifest = Manifest::from_bytes(doc.as_bytes().to_vec()).unwrap();

        assert_eq!(manifest.raw(), Bytes::from(doc));
        assert_eq!(manifest.info().name, "TamilBlasters");
        assert_eq!(manifest.info().version, "1.0.0");
        assert!(manifest.info().catalogs.is_empty());
    }

    #[test]
    fn test_rejects_missing_fields() {
        assert!(Manifest::from_bytes(r#"{"name":"x","version":"1"}"#.as_bytes().to_vec()).is_err());
        assert!(Manifest::from_bytes(r#"{"name":1,"version":"1","description":"d"}"#.as_bytes().to_vec()).is_err());
        assert!(Manifest::from_bytes(b"not json".to_vec()).is_err());
    }

    #[test]
    fn test_bundled_manifest_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("manifest.json");
        let manifest = Manifest::load(&path).unwrap();

        assert_eq!(manifest.info().name, "TamilBlasters");
        assert!(manifest
            .info()
            .catalogs
            .iter()
            .any(|c| c.id == "tamil_hdrip" && c.content_type == "movie"));
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(Manifest::load(Path::new("/nonexistent/manifest.json")).is_err());
    }
}
