//! On-disk artifacts for scraped brands.
//!
//! Every brand gets two files keyed by its slug: the raw rendered markup under
//! the debug directory and the extracted records under the output directory.
//! Both are written through a temp file and renamed into place, so a reader
//! never sees a partially written artifact.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ScrapeError;
use crate::models::ProductRecord;

/// Filename (without extension) used for the rendered index page.
///
/// Slugs of real names never start with `_`, so this cannot collide with a brand.
pub const INDEX_ARTIFACT: &str = "_index";

/// Slug for display names without a single letter or digit.
pub const UNNAMED_SLUG: &str = "_unnamed";

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{Alphabetic}\p{Nd}]+").expect("valid slug pattern"));

/// Filesystem-safe identifier for a brand display name.
///
/// Lowercases the name and collapses every run of non-alphanumeric
/// characters to a single `_`. Leading and trailing separators are dropped.
/// Names with nothing left map to [`UNNAMED_SLUG`].
pub fn brand_slug(display_name: &str) -> String {
    let lowered = display_name.to_lowercase();
    let collapsed = NON_ALNUM.replace_all(&lowered, "_");
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        UNNAMED_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Writes brand artifacts under the configured root directories.
#[derive(Debug, Clone)]
pub struct BrandStore {
    html_debug_dir: PathBuf,
    output_dir: PathBuf,
}

impl BrandStore {
    pub fn new(html_debug_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            html_debug_dir: html_debug_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Create both root directories if absent.
    pub async fn ensure_dirs(&self) -> Result<(), ScrapeError> {
        for dir in [&self.html_debug_dir, &self.output_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ScrapeError::persist(dir, e))?;
        }
        Ok(())
    }

    pub fn debug_path(&self, slug: &str) -> PathBuf {
        self.html_debug_dir.join(format!("{}.html", slug))
    }

    pub fn output_path(&self, slug: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", slug))
    }

    /// Save the rendered index page.
    pub async fn write_index_html(&self, html: &str) -> Result<PathBuf, ScrapeError> {
        self.write_debug_html(INDEX_ARTIFACT, html).await
    }

    /// Save raw brand-page markup, replacing any earlier copy.
    pub async fn write_debug_html(&self, slug: &str, html: &str) -> Result<PathBuf, ScrapeError> {
        let path = self.debug_path(slug);
        write_atomic(path.clone(), html.as_bytes().to_vec()).await?;
        Ok(path)
    }

    /// Save extracted records as pretty-printed JSON, replacing any earlier copy.
    pub async fn write_records(
        &self,
        slug: &str,
        records: &[ProductRecord],
    ) -> Result<PathBuf, ScrapeError> {
        let path = self.output_path(slug);
        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| ScrapeError::persist(&path, std::io::Error::other(e)))?;
        write_atomic(path.clone(), json).await?;
        Ok(path)
    }
}

/// Write `contents` to `path` through a sibling temp file and rename.
async fn write_atomic(path: PathBuf, contents: Vec<u8>) -> Result<(), ScrapeError> {
    let target = path.clone();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&target, &contents))
        .await
        .map_err(|e| ScrapeError::persist(&path, std::io::Error::other(e)))?
        .map_err(|e| ScrapeError::persist(&path, e))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn write_atomic_blocking(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
