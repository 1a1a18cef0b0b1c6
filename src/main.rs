//! gridscrape - product grid scraper for retail brand pages.

mod cli;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log filter used when `RUST_LOG` is unset.
fn default_log_filter() -> &'static str {
    if cli::is_verbose() {
        "gridscrape=info"
    } else {
        "gridscrape=warn"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may set RUST_LOG, so it goes first
    let _ = dotenvy::dotenv();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    cli::run().await
}
