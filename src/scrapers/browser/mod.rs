//! Headless-browser page renderer.
//!
//! Uses chromiumoxide (CDP). Every render launches its own browser, waits for
//! client-side content to settle, scrolls to trigger lazy loading and returns
//! the final DOM. Browser launch is serialized through a [`SessionGate`];
//! navigation and scrolling run concurrently across renders.

mod config;
mod scroll;
#[cfg(feature = "browser")]
mod session;

pub use config::{BrowserEngineConfig, DEFAULT_USER_AGENT};
pub use scroll::{scroll_until_stable, settle_and_scroll, ScrollTarget};

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::models::RenderedPage;
use crate::scrapers::renderer::{PageRenderer, RenderTiming, SessionGate};

#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::Page;
#[cfg(feature = "browser")]
use tracing::{debug, info};

#[cfg(feature = "browser")]
use session::BrowserSession;

/// Renders pages in a real headless browser.
pub struct BrowserRenderer {
    config: BrowserEngineConfig,
    timing: RenderTiming,
    gate: SessionGate,
}

impl BrowserRenderer {
    pub fn new(config: BrowserEngineConfig, timing: RenderTiming, gate: SessionGate) -> Self {
        Self {
            config,
            timing,
            gate,
        }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageRenderer for BrowserRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage, ScrapeError> {
        let session = {
            let _guard = self.gate.enter().await;
            BrowserSession::open(&self.config)
                .await
                .map_err(|e| ScrapeError::render(url, format!("{:#}", e)))?
        };

        // Session is released on every path
        let result = self.render_in(&session, url).await;
        session.close().await;
        result
    }
}

#[cfg(feature = "browser")]
impl BrowserRenderer {
    async fn render_in(
        &self,
        session: &BrowserSession,
        url: &str,
    ) -> Result<RenderedPage, ScrapeError> {
        let page = session
            .new_page()
            .await
            .map_err(|e| ScrapeError::render(url, format!("{:#}", e)))?;

        let result = self.render_page(&page, url).await;
        let _ = page.close().await;
        result
    }

    async fn render_page(&self, page: &Page, url: &str) -> Result<RenderedPage, ScrapeError> {
        // Set user agent first (before any navigation)
        let mut ua = SetUserAgentOverrideParams::new(self.config.user_agent.clone());
        ua.accept_language = Some(self.config.lang.clone());
        page.execute(ua)
            .await
            .map_err(|e| ScrapeError::render(url, e))?;

        self.navigate_to_url(page, url).await?;

        let scroller = PageScroller { page, url };
        let cycles = settle_and_scroll(&scroller, &self.timing).await?;
        debug!("Finished scrolling {} after {} cycle(s)", url, cycles);

        let content = page
            .content()
            .await
            .map_err(|e| ScrapeError::render(url, e))?;

        Ok(RenderedPage::new(url, content))
    }

    /// Navigate to a URL with timeout handling.
    async fn navigate_to_url(&self, page: &Page, url: &str) -> Result<(), ScrapeError> {
        info!("Navigating to {}", url);
        let nav_timeout = Duration::from_secs(self.config.timeout);
        tokio::time::timeout(nav_timeout, page.goto(url))
            .await
            .map_err(|_| ScrapeError::RenderTimeout {
                url: url.to_string(),
                secs: self.config.timeout,
            })?
            .map_err(|e| ScrapeError::render(url, e))?;
        Ok(())
    }
}

/// Scroll driver over a live browser tab.
#[cfg(feature = "browser")]
struct PageScroller<'a> {
    page: &'a Page,
    url: &'a str,
}

#[cfg(feature = "browser")]
#[async_trait]
impl ScrollTarget for PageScroller<'_> {
    async fn scroll_height(&self) -> Result<u64, ScrapeError> {
        let height: f64 = self
            .page
            .evaluate("document.body.scrollHeight")
            .await
            .map_err(|e| ScrapeError::render(self.url, e))?
            .into_value()
            .map_err(|e| ScrapeError::render(self.url, e))?;
        Ok(height as u64)
    }

    async fn scroll_to_bottom(&self) -> Result<(), ScrapeError> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await
            .map_err(|e| ScrapeError::render(self.url, e))?;
        Ok(())
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[async_trait]
impl PageRenderer for BrowserRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage, ScrapeError> {
        let _ = (&self.config, &self.timing, &self.gate);
        Err(ScrapeError::render(
            url,
            "Browser support not compiled. Rebuild with: cargo build --features browser",
        ))
    }
}
