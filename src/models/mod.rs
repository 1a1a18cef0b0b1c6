//! Data models for brand scraping.

mod product;
mod task;

pub use product::{
    BrandLink, BrandResult, ProductRecord, RenderedPage, NOT_AVAILABLE, OUT_OF_STOCK,
};
pub use task::{TaskOutcome, TaskState};
