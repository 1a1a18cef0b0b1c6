//! Fetch, parse and schedule brand scrapes.

pub mod browser;
pub mod discover;
pub mod extract;
pub mod renderer;
pub mod scheduler;
pub mod task;

pub use browser::{BrowserEngineConfig, BrowserRenderer};
pub use discover::{discover, discover_links, match_targets, resolve_url, site_domain};
pub use extract::extract_products;
pub use renderer::{PageRenderer, RenderTiming, SessionGate};
pub use scheduler::{CompletionStream, Scheduler, DEFAULT_CONCURRENCY};
pub use task::BrandTask;
