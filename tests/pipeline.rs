//! End-to-end scheduler runs against stub renderers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::tempdir;

use gridscrape::models::{ProductRecord, RenderedPage, TaskOutcome};
use gridscrape::scrapers::{PageRenderer, Scheduler, SessionGate};
use gridscrape::storage::BrandStore;
use gridscrape::ScrapeError;

const BASE: &str = "https://www.cigarpage.com";

fn index_url() -> String {
    format!("{}/brands", BASE)
}

fn brand_page(items: &[&str]) -> String {
    let rows: String = items
        .iter()
        .map(|name| {
            format!(
                r#"<tr><td><div class="cigar-alt-name">{}</div></td><td>Box of 20</td><td><span style="color:green">In Stock</span></td><td><span class="price">$99.95</span><div class="msrp">MSRP $120.00</div></td><td></td></tr>"#,
                name
            )
        })
        .collect();
    format!(
        r#"<html><body><table class="cigar-grid"><tbody>{}</tbody></table></body></html>"#,
        rows
    )
}

fn index_page(brands: &[(&str, &str)]) -> String {
    let links: String = brands
        .iter()
        .map(|(name, href)| format!(r#"<li><a href="{}">{}</a></li>"#, href, name))
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", links)
}

/// Fixed pages keyed by URL, with optional per-render delay and activity tracking.
struct StubSite {
    pages: HashMap<String, String>,
    delay: Duration,
    gate: SessionGate,
    active: AtomicUsize,
    max_active: AtomicUsize,
    constructing: AtomicUsize,
    max_constructing: AtomicUsize,
}

impl StubSite {
    fn new(pages: Vec<(String, String)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            delay: Duration::ZERO,
            gate: SessionGate::new(),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            constructing: AtomicUsize::new(0),
            max_constructing: AtomicUsize::new(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl PageRenderer for StubSite {
    async fn render(&self, url: &str) -> Result<RenderedPage, ScrapeError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        {
            let _guard = self.gate.enter().await;
            let building = self.constructing.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_constructing.fetch_max(building, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(1)).await;
            self.constructing.fetch_sub(1, Ordering::SeqCst);
        }

        tokio::time::sleep(self.delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        self.pages
            .get(url)
            .map(|html| RenderedPage::new(url, html.clone()))
            .ok_or_else(|| ScrapeError::render(url, "net::ERR_CONNECTION_REFUSED"))
    }
}

fn store_in(dir: &std::path::Path) -> BrandStore {
    BrandStore::new(dir.join("html_debug"), dir.join("brand_data"))
}

fn targets(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_single_matching_brand_end_to_end() {
    let dir = tempdir().unwrap();
    let store = store_in(dir.path());
    let site = StubSite::new(vec![
        (
            index_url(),
            index_page(&[
                ("Drew Estate Cigars", "/drew-estate"),
                ("Nowhere Corp", "/nowhere"),
            ]),
        ),
        (
            format!("{}/drew-estate", BASE),
            brand_page(&["Liga Privada No. 9", "Undercrown Shade"]),
        ),
    ]);

    let scheduler = Scheduler::new(Arc::new(site), store.clone(), BASE);
    let summary = scheduler
        .run(&index_url(), &targets(&["Drew Estate"]))
        .await
        .unwrap();

    assert_eq!(
        summary,
        vec![TaskOutcome::Success {
            brand: "Drew Estate Cigars".into(),
            record_count: 2
        }]
    );

    assert!(store.debug_path("_index").exists());
    assert!(store.debug_path("drew_estate_cigars").exists());
    assert!(!store.output_path("nowhere_corp").exists());

    let json = std::fs::read_to_string(store.output_path("drew_estate_cigars")).unwrap();
    let records: Vec<ProductRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Liga Privada No. 9");
    assert_eq!(records[0].msrp, "$120.00");
    assert!(json.starts_with("[\n  {\n    \"Name\""));
}

#[tokio::test]
async fn test_failed_brand_does_not_affect_siblings() {
    let dir = tempdir().unwrap();
    let store = store_in(dir.path());

    let brands = [
        ("Brand Alpha", "/alpha"),
        ("Brand Bravo", "/bravo"),
        ("Brand Charlie", "/charlie"),
        ("Brand Delta", "/delta"),
        ("Brand Echo", "/echo"),
    ];
    let mut pages = vec![(index_url(), index_page(&brands))];
    for (i, (_, href)) in brands.iter().enumerate() {
        // Bravo has no page and fails to render
        if i != 1 {
            pages.push((format!("{}{}", BASE, href), brand_page(&["Robusto"])));
        }
    }

    let scheduler = Scheduler::new(Arc::new(StubSite::new(pages)), store.clone(), BASE)
        .with_concurrency(2);
    let summary = scheduler
        .run(&index_url(), &targets(&["Brand"]))
        .await
        .unwrap();

    assert_eq!(summary.len(), 5);
    let brands_in_order: Vec<&str> = summary.iter().map(|o| o.brand()).collect();
    assert_eq!(
        brands_in_order,
        vec![
            "Brand Alpha",
            "Brand Bravo",
            "Brand Charlie",
            "Brand Delta",
            "Brand Echo"
        ]
    );
    for (i, outcome) in summary.iter().enumerate() {
        assert_eq!(outcome.is_success(), i != 1, "outcome {}: {:?}", i, outcome);
    }
    match &summary[1] {
        TaskOutcome::Failure { cause, .. } => assert!(cause.contains("ERR_CONNECTION_REFUSED")),
        other => panic!("expected failure, got {:?}", other),
    }

    assert!(!store.output_path("brand_bravo").exists());
    assert!(!store.debug_path("brand_bravo").exists());
    assert!(store.output_path("brand_echo").exists());
}

#[tokio::test]
async fn test_active_renders_never_exceed_pool_size() {
    let dir = tempdir().unwrap();
    let store = store_in(dir.path());

    let names = ["Maker One", "Maker Two", "Maker Three", "Maker Four", "Maker Five"];
    let hrefs = ["/m1", "/m2", "/m3", "/m4", "/m5"];
    let links: Vec<(&str, &str)> = names.iter().copied().zip(hrefs.iter().copied()).collect();

    let mut pages = vec![(index_url(), index_page(&links))];
    for href in hrefs {
        pages.push((format!("{}{}", BASE, href), brand_page(&["Toro"])));
    }

    let site = Arc::new(StubSite::new(pages).with_delay(Duration::from_millis(30)));
    let scheduler = Scheduler::new(site.clone(), store, BASE).with_concurrency(2);

    let tasks = scheduler
        .plan(&index_url(), &targets(&["Maker"]))
        .await
        .unwrap();
    assert_eq!(tasks.len(), 5);

    let stream = scheduler.dispatch(tasks);
    assert_eq!(stream.total(), 5);

    let mut completed = Vec::new();
    let summary = stream
        .collect_with(|outcome| completed.push(outcome.brand().to_string()))
        .await;

    assert_eq!(summary.len(), 5);
    assert!(summary.iter().all(TaskOutcome::is_success));
    assert_eq!(completed.len(), 5);

    // Two renders overlapped, but never more, and construction never overlapped.
    assert_eq!(site.max_active.load(Ordering::SeqCst), 2);
    assert_eq!(site.max_constructing.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rerun_produces_identical_output() {
    let dir = tempdir().unwrap();
    let store = store_in(dir.path());
    let pages = vec![
        (
            index_url(),
            index_page(&[("Arturo Fuente", "https://www.cigarpage.com/fuente.html")]),
        ),
        (
            format!("{}/fuente.html", BASE),
            brand_page(&["Hemingway Short Story", "Don Carlos"]),
        ),
    ];

    let scheduler = Scheduler::new(Arc::new(StubSite::new(pages)), store.clone(), BASE);
    let wanted = targets(&["arturo fuente"]);

    scheduler.run(&index_url(), &wanted).await.unwrap();
    let first = std::fs::read(store.output_path("arturo_fuente")).unwrap();

    scheduler.run(&index_url(), &wanted).await.unwrap();
    let second = std::fs::read(store.output_path("arturo_fuente")).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unreachable_index_dispatches_nothing() {
    let dir = tempdir().unwrap();
    let store = store_in(dir.path());
    let scheduler = Scheduler::new(Arc::new(StubSite::new(Vec::new())), store.clone(), BASE);

    let err = scheduler
        .run(&index_url(), &targets(&["Drew Estate"]))
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    assert!(!store.debug_path("_index").exists());
}
