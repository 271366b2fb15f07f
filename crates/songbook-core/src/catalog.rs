//! Catalog data model and loading.
//!
//! The catalog lives in static JSON files: one configuration document listing
//! the sources ("drives"), and one song list per source. Locations are either
//! http(s) URLs or local paths; a source's `outputFile` is resolved relative
//! to the configuration document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One song entry in a source's feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    /// Sequence number written by the feed builder; not used for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    pub pdf_url: String,
}

/// One configured catalog source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub output_file: String,
}

impl SourceConfig {
    /// Tab label: the display name when present.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// The configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub drives: Vec<SourceConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The configuration could not be fetched, parsed, or listed no sources.
    #[error("could not load catalog configuration from {location}: {reason}")]
    Config { location: String, reason: String },
    /// One source's song list could not be loaded.
    #[error("could not load songs for source {source_id}: {reason}")]
    SourceLoad { source_id: String, reason: String },
}

/// A place a JSON document can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Url(String),
    File(PathBuf),
}

impl Location {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::File(PathBuf::from(s))
        }
    }

    /// Resolve `relative` against this location, the way a page resolves a
    /// relative `fetch()` against its own URL. Absolute targets pass through.
    pub fn join(&self, relative: &str) -> Self {
        if relative.starts_with("http://") || relative.starts_with("https://") {
            return Self::Url(relative.to_string());
        }
        match self {
            Self::Url(base) => match reqwest::Url::parse(base).and_then(|b| b.join(relative)) {
                Ok(u) => Self::Url(u.to_string()),
                Err(_) => Self::Url(relative.to_string()),
            },
            Self::File(base) => {
                let rel = Path::new(relative);
                if rel.is_absolute() {
                    return Self::File(rel.to_path_buf());
                }
                let dir = base.parent().unwrap_or_else(|| Path::new(""));
                Self::File(dir.join(rel))
            }
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(u) => write!(f, "{}", u),
            Self::File(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Reads catalog documents. Holds one HTTP client for all requests.
#[derive(Clone)]
pub struct CatalogLoader {
    client: reqwest::Client,
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch the source list. Empty lists are an error.
    pub async fn load_sources(&self, config: &Location) -> Result<Vec<SourceConfig>, CatalogError> {
        let config_err = |reason: String| CatalogError::Config {
            location: config.to_string(),
            reason,
        };
        let doc: CatalogDocument = self.fetch_json(config).await.map_err(|e| config_err(e.to_string()))?;
        if doc.drives.is_empty() {
            return Err(config_err("no sources configured".to_string()));
        }
        info!("Loaded {} catalog sources from {}", doc.drives.len(), config);
        Ok(doc.drives)
    }

    /// Fetch one source's song list.
    pub async fn load_catalog(
        &self,
        config: &Location,
        source: &SourceConfig,
    ) -> Result<Vec<SongRecord>, CatalogError> {
        let location = config.join(&source.output_file);
        debug!("Fetching songs for {} from {}", source.id, location);
        self.fetch_json(&location)
            .await
            .map_err(|e| CatalogError::SourceLoad {
                source_id: source.id.clone(),
                reason: e.to_string(),
            })
    }

    /// Fetch every source's song list concurrently. A failing source is
    /// logged and maps to an empty list; it never fails the whole load.
    pub async fn load_all_catalogs(
        &self,
        config: &Location,
        sources: &[SourceConfig],
    ) -> HashMap<String, Vec<SongRecord>> {
        let fetches = sources.iter().map(|source| async move {
            let songs = match self.load_catalog(config, source).await {
                Ok(songs) => {
                    info!("Loaded {} songs for source {}", songs.len(), source.id);
                    songs
                }
                Err(e) => {
                    warn!("{}", e);
                    Vec::new()
                }
            };
            (source.id.clone(), songs)
        });
        join_all(fetches).await.into_iter().collect()
    }

    async fn fetch_json<T: DeserializeOwned>(&self, location: &Location) -> anyhow::Result<T> {
        match location {
            Location::Url(url) => {
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    anyhow::bail!("HTTP {}", response.status());
                }
                Ok(response.json().await?)
            }
            Location::File(path) => {
                let text = tokio::fs::read_to_string(path).await?;
                Ok(serde_json::from_str(&text)?)
            }
        }
    }
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_song_record() {
        let json = r#"[
            {"id": 1, "name": "Ave Maria", "pdfUrl": "https://x/uc?id=A"},
            {"name": "Moonlight", "artist": "Beethoven", "pdfUrl": "https://x/d/B/view"}
        ]"#;
        let songs: Vec<SongRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].id, Some(1));
        assert_eq!(songs[0].artist, None);
        assert_eq!(songs[1].artist.as_deref(), Some("Beethoven"));
        assert_eq!(songs[1].pdf_url, "https://x/d/B/view");
    }

    #[test]
    fn test_source_label_prefers_display_name() {
        let doc: CatalogDocument = serde_json::from_str(
            r#"{"drives": [
                {"id": "a", "name": "Choir", "displayName": "Choir Library", "outputFile": "songs-a.json"},
                {"id": "b", "name": "Solo", "outputFile": "songs-b.json"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(doc.drives[0].label(), "Choir Library");
        assert_eq!(doc.drives[1].label(), "Solo");
    }

    #[test]
    fn test_location_join_url() {
        let base = Location::parse("https://example.org/site/config.json");
        assert_eq!(
            base.join("songs-a.json"),
            Location::Url("https://example.org/site/songs-a.json".to_string())
        );
        assert_eq!(
            base.join("https://cdn.example.org/b.json"),
            Location::Url("https://cdn.example.org/b.json".to_string())
        );
    }

    #[test]
    fn test_location_join_file() {
        let base = Location::parse("/srv/catalog/config.json");
        assert_eq!(
            base.join("songs-a.json"),
            Location::File(PathBuf::from("/srv/catalog/songs-a.json"))
        );
        let bare = Location::parse("config.json");
        assert_eq!(bare.join("songs.json"), Location::File(PathBuf::from("songs.json")));
    }
}
