//! Page rendering abstraction.
//!
//! The scheduler only sees [`PageRenderer`]; the headless browser is one
//! implementation, test stubs returning canned markup are another.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::error::ScrapeError;
use crate::models::RenderedPage;

/// Fetches a URL and returns its fully rendered markup.
///
/// Each call owns its own browser session for the duration of the render;
/// sessions are never shared between concurrent calls.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RenderedPage, ScrapeError>;
}

#[async_trait]
impl<R: PageRenderer + ?Sized> PageRenderer for Arc<R> {
    async fn render(&self, url: &str) -> Result<RenderedPage, ScrapeError> {
        (**self).render(url).await
    }
}

/// Waits applied after navigation so client-side content can load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderTiming {
    /// Fixed wait after navigation before scrolling starts.
    #[serde(default = "default_initial_wait")]
    pub initial_wait_secs: u64,

    /// Pause after each scroll before measuring the page height.
    #[serde(default = "default_scroll_pause")]
    pub scroll_pause_secs: u64,

    /// Upper bound on scroll-and-measure cycles.
    #[serde(default = "default_scroll_attempts")]
    pub scroll_attempts: u32,
}

fn default_initial_wait() -> u64 {
    8
}

fn default_scroll_pause() -> u64 {
    3
}

fn default_scroll_attempts() -> u32 {
    5
}

impl Default for RenderTiming {
    fn default() -> Self {
        Self {
            initial_wait_secs: default_initial_wait(),
            scroll_pause_secs: default_scroll_pause(),
            scroll_attempts: default_scroll_attempts(),
        }
    }
}

impl RenderTiming {
    pub fn initial_wait(&self) -> Duration {
        Duration::from_secs(self.initial_wait_secs)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_secs(self.scroll_pause_secs)
    }
}

/// Process-wide gate serializing browser session construction.
///
/// Launching several browsers at once is unreliable, so renderers hold the
/// gate while a session starts and release it before navigating. Clones
/// share the same lock.
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    lock: Arc<Mutex<()>>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to session construction.
    pub async fn enter(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}
