//! Configuration management for gridscrape using the prefer crate.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::scrapers::{resolve_url, BrowserEngineConfig, RenderTiming, DEFAULT_CONCURRENCY};
use crate::storage::BrandStore;

/// Environment variable pointing at a running Chrome DevTools endpoint.
pub const REMOTE_BROWSER_ENV: &str = "GRIDSCRAPE_BROWSER_URL";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site root; relative brand links are resolved against it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the brand index page, relative to `base_url`.
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Brand names to scrape (case-insensitive substring match on link text).
    #[serde(default = "default_brands")]
    pub brands: Vec<String>,

    /// Where raw rendered pages are saved.
    #[serde(default = "default_html_debug_dir")]
    pub html_debug_dir: PathBuf,

    /// Where per-brand JSON files are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of brands rendered at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub timing: RenderTiming,

    #[serde(default)]
    pub browser: BrowserEngineConfig,
}

fn default_base_url() -> String {
    "https://www.cigarpage.com".to_string()
}

fn default_index_path() -> String {
    "/brands".to_string()
}

fn default_brands() -> Vec<String> {
    vec!["Drew Estate".to_string(), "Arturo Fuente".to_string()]
}

fn default_html_debug_dir() -> PathBuf {
    PathBuf::from("html_debug")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("brand_data")
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            index_path: default_index_path(),
            brands: default_brands(),
            html_debug_dir: default_html_debug_dir(),
            output_dir: default_output_dir(),
            concurrency: default_concurrency(),
            timing: RenderTiming::default(),
            browser: BrowserEngineConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration, discovering the file with prefer.
    /// Falls back to defaults when no file is found or it fails to parse.
    pub async fn load() -> Self {
        match prefer::load("gridscrape").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config {}: {:#}", path.display(), e);
                        Self::default_with_env()
                    }
                },
                None => Self::default_with_env(),
            },
            Err(_) => Self::default_with_env(),
        }
    }

    /// Defaults with environment overrides applied.
    pub fn default_with_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let config: Config = match ext {
            "json" => serde_json::from_str(&contents).context("Failed to parse JSON config")?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).context("Failed to parse YAML config")?
            }
            _ => toml::from_str(&contents).context("Failed to parse TOML config")?,
        };

        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(REMOTE_BROWSER_ENV) {
            if !url.trim().is_empty() {
                self.browser.remote_url = Some(url);
            }
        }
        self
    }

    /// Absolute URL of the brand index page.
    pub fn index_url(&self) -> anyhow::Result<String> {
        resolve_url(&self.base_url, &self.index_path)
            .with_context(|| format!("Invalid base URL '{}'", self.base_url))
    }

    /// Artifact store rooted at the configured directories.
    pub fn store(&self) -> BrandStore {
        BrandStore::new(&self.html_debug_dir, &self.output_dir)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.brands, vec!["Drew Estate", "Arturo Fuente"]);
        assert_eq!(
            config.index_url().unwrap(),
            "https://www.cigarpage.com/brands"
        );
        assert_eq!(config.timing.scroll_attempts, 5);
    }

    #[tokio::test]
    async fn test_load_partial_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gridscrape.toml");
        std::fs::write(
            &path,
            r#"
brands = ["Padron"]
concurrency = 2

[timing]
scroll_pause_secs = 1
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.brands, vec!["Padron"]);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.timing.scroll_pause_secs, 1);
        assert_eq!(config.timing.initial_wait_secs, 8);
        assert_eq!(config.output_dir, PathBuf::from("brand_data"));
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = tempdir().unwrap();

        let yaml = dir.path().join("gridscrape.yaml");
        std::fs::write(&yaml, "base_url: https://shop.example.com\nindex_path: /makers\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.index_url().unwrap(), "https://shop.example.com/makers");

        let json = dir.path().join("gridscrape.json");
        std::fs::write(&json, r#"{"browser": {"headless": false}}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert!(!config.browser.headless);
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gridscrape.toml");
        std::fs::write(&path, "concurrency = \"many\"").unwrap();
        assert!(Config::load_from_path(&path).await.is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.base_url, config.base_url);
        assert_eq!(parsed.browser.user_agent, config.browser.user_agent);
    }
}
