//! Product grid extraction.
//!
//! Pulls one [`ProductRecord`] per qualifying row of the `table.cigar-grid`
//! element. Missing elements degrade to sentinel values; a page without the
//! grid yields no records.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::models::{ProductRecord, NOT_AVAILABLE, OUT_OF_STOCK};

/// Rows with fewer cells than this are layout rows, not products.
pub const MIN_PRODUCT_CELLS: usize = 5;

/// Label prefixed to the list price in the MSRP element.
const MSRP_LABEL: &str = "MSRP";

macro_rules! selector {
    ($name:ident, $css:literal) => {
        static $name: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($css).expect(concat!("valid selector: ", $css)));
    };
}

selector!(GRID, "table.cigar-grid");
selector!(ROW, "tr");
selector!(CELL, "td");
selector!(ALT_NAME, "div.cigar-alt-name");
selector!(SPAN, "span");
selector!(PRICE, "span.price");
selector!(MSRP, "div.msrp");

/// Extract product records from rendered markup, in row order.
pub fn extract_products(html: &str) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);

    let Some(table) = document.select(&GRID).next() else {
        warn!("No cigar-grid table found on this page.");
        return Vec::new();
    };

    let records: Vec<ProductRecord> = table.select(&ROW).filter_map(parse_row).collect();
    debug!("Extracted {} product record(s)", records.len());
    records
}

/// Parse one grid row; `None` when it has too few cells.
fn parse_row(row: ElementRef<'_>) -> Option<ProductRecord> {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
    if cells.len() < MIN_PRODUCT_CELLS {
        return None;
    }

    let (main, pack, stock, price) = (cells[0], cells[1], cells[2], cells[3]);

    let name = main
        .select(&ALT_NAME)
        .next()
        .map(stripped_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let pack_size = non_empty(stripped_text(pack)).unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let stock_status = stock
        .select(&SPAN)
        .find(|span| is_in_stock_style(span.value().attr("style")))
        .map(stripped_text)
        .unwrap_or_else(|| OUT_OF_STOCK.to_string());

    let price_text = price
        .select(&PRICE)
        .next()
        .map(stripped_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let msrp = price
        .select(&MSRP)
        .next()
        .map(|div| strip_label(&stripped_text(div), MSRP_LABEL))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    Some(ProductRecord {
        name,
        pack_size,
        stock_status,
        price: price_text,
        msrp,
    })
}

/// Concatenated descendant text with each text node trimmed.
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Whether an inline style marks the element as in stock (green text).
fn is_in_stock_style(style: Option<&str>) -> bool {
    let Some(style) = style else {
        return false;
    };
    style.split(';').any(|decl| {
        let compact: String = decl
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact == "color:green"
    })
}

/// Remove every occurrence of `label` and trim what is left.
///
/// Also trims `Â`, the residue of a non-breaking space decoded as Latin-1.
fn strip_label(text: &str, label: &str) -> String {
    text.replace(label, "")
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{00C2}')
        .to_string()
}
