//! gridscrape - product grid scraper for retail brand pages.
//!
//! Renders a brand index page in a headless browser, follows the links for
//! the requested brands with bounded concurrency, extracts the product grid
//! from each brand page and writes one JSON file per brand.

pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod storage;

pub use config::Config;
pub use error::ScrapeError;
