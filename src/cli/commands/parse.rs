//! Offline extraction from a saved page.

use std::path::Path;

use anyhow::Context;

use gridscrape::scrapers::extract_products;

use crate::cli::helpers::success;

/// Extract the product grid from `html_file` and print or write it as JSON.
pub async fn cmd_parse(html_file: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let html = tokio::fs::read_to_string(html_file)
        .await
        .with_context(|| format!("Failed to read {}", html_file.display()))?;

    let records = extract_products(&html);
    let json = serde_json::to_string_pretty(&records)?;

    match out {
        Some(path) => {
            tokio::fs::write(path, &json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} items to {}",
                success(),
                records.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
