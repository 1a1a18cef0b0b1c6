//! Dry-run brand listing.

use console::style;

use gridscrape::scrapers::{
    discover_links, match_targets, resolve_url, site_domain, BrowserRenderer, PageRenderer,
    SessionGate,
};
use gridscrape::Config;

use crate::cli::helpers::{arrow, warning};

/// Render the index page and show which links the configured brands match.
pub async fn cmd_brands(config: &Config, all: bool) -> anyhow::Result<()> {
    let index_url = config.index_url()?;
    let domain = site_domain(&config.base_url)
        .ok_or_else(|| anyhow::anyhow!("Invalid base URL '{}'", config.base_url))?;

    let renderer = BrowserRenderer::new(
        config.browser.clone(),
        config.timing.clone(),
        SessionGate::new(),
    );
    let index = renderer.render(&index_url).await?;

    let links = discover_links(&index.content, &domain);
    if links.is_empty() {
        println!("{} No brand links found.", warning());
        return Ok(());
    }

    let listed = if all {
        links
    } else {
        match_targets(links, &config.brands)
    };

    if listed.is_empty() {
        println!("{} No matching brand variations found.", warning());
        return Ok(());
    }

    println!(
        "{} ({} link{})",
        style(if all { "On-site links" } else { "Matched brands" }).bold(),
        listed.len(),
        if listed.len() == 1 { "" } else { "s" }
    );
    for link in &listed {
        let url = resolve_url(&config.base_url, &link.target_url)
            .unwrap_or_else(|_| link.target_url.clone());
        println!("  {} {} {}", arrow(), link.display_name, style(url).dim());
    }

    Ok(())
}
