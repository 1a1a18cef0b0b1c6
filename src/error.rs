//! Scrape pipeline error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Render timed out after {secs}s for {url}")]
    RenderTimeout { url: String, secs: u64 },
    #[error("Render failed for {url}: {cause}")]
    Render { url: String, cause: String },
    #[error("Failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No brand links found on index page")]
    NoLinksFound,
    #[error("No matching brand variations found")]
    NoMatchingBrands,
}

impl ScrapeError {
    pub fn render(url: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        ScrapeError::Render {
            url: url.into(),
            cause: cause.to_string(),
        }
    }

    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::Persist {
            path: path.into(),
            source,
        }
    }

    /// Whether the run must stop. The "nothing to do" variants end a run
    /// without dispatching anything but are not failures.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ScrapeError::NoLinksFound | ScrapeError::NoMatchingBrands)
    }
}
