//! Full scrape: index page, brand discovery, bounded fan-out, summary.

use std::sync::Arc;

use console::style;

use gridscrape::scrapers::{BrowserRenderer, Scheduler, SessionGate};
use gridscrape::{Config, ScrapeError};

use crate::cli::helpers::{arrow, brand_progress, outcome_line, warning};

/// Scrape the requested brands (or the configured list when none are given).
pub async fn cmd_scrape(config: &Config, brands: &[String]) -> anyhow::Result<()> {
    let targets: Vec<String> = if brands.is_empty() {
        config.brands.clone()
    } else {
        brands.to_vec()
    };

    let index_url = config.index_url()?;
    let renderer = BrowserRenderer::new(
        config.browser.clone(),
        config.timing.clone(),
        SessionGate::new(),
    );
    let scheduler = Scheduler::new(Arc::new(renderer), config.store(), &config.base_url)
        .with_concurrency(config.concurrency);

    println!(
        "{} Scraping {} from {}",
        style("→").cyan(),
        targets.join(", "),
        index_url
    );

    let tasks = match scheduler.plan(&index_url, &targets).await {
        Ok(tasks) => tasks,
        Err(e) if !e.is_fatal() => {
            println!("{} {}", warning(), nothing_to_do(&e));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "  {} {} brand(s), {} at a time",
        arrow(),
        tasks.len(),
        scheduler.concurrency()
    );

    let stream = scheduler.dispatch(tasks);
    let pb = brand_progress(stream.total());
    let outcomes = stream
        .collect_with(|outcome| {
            pb.println(outcome_line(outcome));
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    println!();
    for outcome in &outcomes {
        if outcome.is_success() {
            println!("{} {}", style("[DONE]").green(), outcome);
        } else {
            println!("{} {}", style("[FAILED]").red(), outcome);
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        println!(
            "{} {} of {} brand(s) failed",
            warning(),
            failed,
            outcomes.len()
        );
    }

    Ok(())
}

fn nothing_to_do(e: &ScrapeError) -> &'static str {
    match e {
        ScrapeError::NoLinksFound => "No brand links found.",
        _ => "No matching brand variations found.",
    }
}
