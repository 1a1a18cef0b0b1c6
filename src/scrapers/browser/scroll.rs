//! Settle delay and scroll-to-bottom loop for lazy-loaded pages.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ScrapeError;
use crate::scrapers::renderer::RenderTiming;

/// A scrollable document whose height can be measured.
#[async_trait]
pub trait ScrollTarget: Send + Sync {
    /// Current `document.body.scrollHeight`.
    async fn scroll_height(&self) -> Result<u64, ScrapeError>;

    /// Scroll the window to the current end of the document.
    async fn scroll_to_bottom(&self) -> Result<(), ScrapeError>;
}

/// Wait the initial settle delay, then scroll until the page stops growing.
pub async fn settle_and_scroll<T>(target: &T, timing: &RenderTiming) -> Result<u32, ScrapeError>
where
    T: ScrollTarget + ?Sized,
{
    tokio::time::sleep(timing.initial_wait()).await;
    scroll_until_stable(target, timing.scroll_pause(), timing.scroll_attempts).await
}

/// Repeatedly scroll to the bottom and pause, stopping once the height is
/// unchanged across one pause or after `max_attempts` cycles.
///
/// Returns the number of scroll cycles performed.
pub async fn scroll_until_stable<T>(
    target: &T,
    pause: Duration,
    max_attempts: u32,
) -> Result<u32, ScrapeError>
where
    T: ScrollTarget + ?Sized,
{
    let mut last_height = target.scroll_height().await?;

    for attempt in 1..=max_attempts {
        target.scroll_to_bottom().await?;
        tokio::time::sleep(pause).await;

        let height = target.scroll_height().await?;
        debug!(
            "Scroll {}/{}: height {} -> {}",
            attempt, max_attempts, last_height, height
        );
        if height == last_height {
            return Ok(attempt);
        }
        last_height = height;
    }

    Ok(max_attempts)
}
