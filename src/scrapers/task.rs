//! A single brand scrape: render, extract, persist.

use tracing::{debug, info, warn};

use crate::error::ScrapeError;
use crate::models::{BrandLink, BrandResult, TaskOutcome, TaskState};
use crate::scrapers::extract::extract_products;
use crate::scrapers::renderer::PageRenderer;
use crate::storage::{brand_slug, BrandStore};

/// Unit of work for one matched brand link.
#[derive(Debug)]
pub struct BrandTask {
    link: BrandLink,
    url: String,
    slug: String,
    state: TaskState,
}

impl BrandTask {
    /// Create a pending task for `link`, whose target is already resolved to `url`.
    pub fn new(link: BrandLink, url: impl Into<String>) -> Self {
        let slug = brand_slug(&link.display_name);
        Self {
            link,
            url: url.into(),
            slug,
            state: TaskState::Pending,
        }
    }

    pub fn brand(&self) -> &str {
        &self.link.display_name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    fn advance(&mut self, next: TaskState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!("[{}] {} -> {}", self.slug, self.state, next);
        self.state = next;
    }

    /// Run the task to a terminal state. Never panics on domain errors;
    /// every failure becomes a [`TaskOutcome::Failure`].
    pub async fn run<R>(&mut self, renderer: &R, store: &BrandStore) -> TaskOutcome
    where
        R: PageRenderer + ?Sized,
    {
        match self.execute(renderer, store).await {
            Ok(result) => {
                self.advance(TaskState::Done);
                TaskOutcome::Success {
                    brand: result.brand_name,
                    record_count: result.records.len(),
                }
            }
            Err(e) => {
                self.advance(TaskState::Failed);
                warn!("Brand '{}' failed: {}", self.brand(), e);
                TaskOutcome::Failure {
                    brand: self.brand().to_string(),
                    cause: e.to_string(),
                }
            }
        }
    }

    async fn execute<R>(
        &mut self,
        renderer: &R,
        store: &BrandStore,
    ) -> Result<BrandResult, ScrapeError>
    where
        R: PageRenderer + ?Sized,
    {
        self.advance(TaskState::Rendering);
        let page = renderer.render(&self.url).await?;

        self.advance(TaskState::Extracting);
        let records = extract_products(&page.content);

        self.advance(TaskState::Persisting);
        let html_path = store.write_debug_html(&self.slug, &page.content).await?;
        debug!(
            "Saved brand page HTML for '{}' to {}",
            self.brand(),
            html_path.display()
        );

        let out_path = store.write_records(&self.slug, &records).await?;
        info!(
            "Wrote {} items to {} for '{}'",
            records.len(),
            out_path.display(),
            self.brand()
        );

        Ok(BrandResult {
            brand_name: self.brand().to_string(),
            records,
        })
    }
}
