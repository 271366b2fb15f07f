use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub downloads: DownloadsConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
}

/// Where the catalog configuration document (`{ "drives": [...] }`) lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// An https:// URL or a local file path. Each drive's `outputFile` is
    /// resolved relative to this location.
    #[serde(default = "default_config_url")]
    pub config_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadsConfig {
    #[serde(default = "platform::downloads_dir")]
    pub dir: PathBuf,
}

/// External PDF reader hand-off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Deep-link template; `{url}` is replaced with the percent-encoded
    /// direct-download URL.
    #[serde(default = "default_scheme_template")]
    pub scheme_template: String,
    /// How long to wait for the terminal to lose focus before opening the
    /// direct URL in the browser instead.
    #[serde(default = "default_fallback_ms")]
    pub fallback_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            config_url: default_config_url(),
        }
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            dir: platform::downloads_dir(),
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            scheme_template: default_scheme_template(),
            fallback_ms: default_fallback_ms(),
        }
    }
}

fn default_config_url() -> String {
    "config.json".to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_scheme_template() -> String {
    "pdfreader://open?url={url}".to_string()
}

fn default_fallback_ms() -> u64 {
    900
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Page size as used by the paginator; zero would divide by zero.
    pub fn page_size(&self) -> usize {
        self.browse.page_size.max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            browse: BrowseConfig::default(),
            downloads: DownloadsConfig::default(),
            reader: ReaderConfig::default(),
        }
    }
}
