//! Page, link and product record types.

use serde::{Deserialize, Serialize};

/// Placeholder for a field whose element is missing from the row.
pub const NOT_AVAILABLE: &str = "N/A";

/// Stock status used when no in-stock marker is present.
pub const OUT_OF_STOCK: &str = "Out of Stock";

/// Fully rendered markup of a single page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub content: String,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
        }
    }
}

/// A brand link discovered on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandLink {
    /// Visible link text, whitespace-trimmed.
    pub display_name: String,
    /// Link target as found in the markup (absolute or site-relative).
    pub target_url: String,
}

impl BrandLink {
    pub fn new(display_name: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            target_url: target_url.into(),
        }
    }
}

/// One product row from the product grid.
///
/// Serialized with the column headings used by the output files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Pack")]
    pub pack_size: String,
    #[serde(rename = "Stock Status")]
    pub stock_status: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "MSRP")]
    pub msrp: String,
}

impl Default for ProductRecord {
    fn default() -> Self {
        Self {
            name: NOT_AVAILABLE.to_string(),
            pack_size: NOT_AVAILABLE.to_string(),
            stock_status: OUT_OF_STOCK.to_string(),
            price: NOT_AVAILABLE.to_string(),
            msrp: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Records extracted for one brand, in page order.
#[derive(Debug, Clone)]
pub struct BrandResult {
    pub brand_name: String,
    pub records: Vec<ProductRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_uses_sentinels() {
        let record = ProductRecord::default();
        assert_eq!(record.name, "N/A");
        assert_eq!(record.pack_size, "N/A");
        assert_eq!(record.stock_status, "Out of Stock");
        assert_eq!(record.price, "N/A");
        assert_eq!(record.msrp, "N/A");
    }

    #[test]
    fn test_record_serializes_with_column_headings() {
        let record = ProductRecord {
            name: "Acid Kuba Kuba".into(),
            pack_size: "Box of 24".into(),
            stock_status: "In Stock".into(),
            price: "$89.99".into(),
            msrp: "$110.00".into(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"Name":"Acid Kuba Kuba","Pack":"Box of 24","Stock Status":"In Stock","Price":"$89.99","MSRP":"$110.00"}"#
        );
    }
}
