//! Bounded-concurrency brand scheduler.
//!
//! Renders the index page once, turns matching brand links into
//! [`BrandTask`]s and runs them on a fixed pool of workers pulling from a
//! shared queue. Outcomes arrive in completion order; the final summary is
//! returned in submission order.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::ScrapeError;
use crate::models::TaskOutcome;
use crate::scrapers::discover::{discover_links, match_targets, resolve_url, site_domain};
use crate::scrapers::renderer::PageRenderer;
use crate::scrapers::task::BrandTask;
use crate::storage::BrandStore;

/// Default number of brand tasks running at once.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Fans brand tasks out over at most `concurrency` workers.
pub struct Scheduler {
    renderer: Arc<dyn PageRenderer>,
    store: BrandStore,
    base_url: String,
    concurrency: usize,
}

impl Scheduler {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        store: BrandStore,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            store,
            base_url: base_url.into(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the worker count. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Scrape every brand on the index page matching `targets`.
    ///
    /// Fails only before dispatch: when the index page cannot be rendered or
    /// saved, or when there is nothing to do ([`ScrapeError::NoLinksFound`],
    /// [`ScrapeError::NoMatchingBrands`]). Individual brand failures are
    /// reported in the returned summary.
    pub async fn run(
        &self,
        index_url: &str,
        targets: &[String],
    ) -> Result<Vec<TaskOutcome>, ScrapeError> {
        let tasks = self.plan(index_url, targets).await?;
        Ok(self.dispatch(tasks).collect().await)
    }

    /// Render the index page and build one pending task per matching brand.
    pub async fn plan(
        &self,
        index_url: &str,
        targets: &[String],
    ) -> Result<Vec<BrandTask>, ScrapeError> {
        let domain = site_domain(&self.base_url)
            .ok_or_else(|| ScrapeError::render(&self.base_url, "invalid base URL"))?;

        self.store.ensure_dirs().await?;

        let index = self.renderer.render(index_url).await?;
        let index_path = self.store.write_index_html(&index.content).await?;
        info!("Saved index HTML to {}", index_path.display());

        let links = discover_links(&index.content, &domain);
        if links.is_empty() {
            return Err(ScrapeError::NoLinksFound);
        }
        info!("Discovered {} on-site link(s)", links.len());

        let matched = match_targets(links, targets);
        if matched.is_empty() {
            return Err(ScrapeError::NoMatchingBrands);
        }

        let tasks: Vec<BrandTask> = matched
            .into_iter()
            .map(|link| {
                let url = resolve_url(&self.base_url, &link.target_url).unwrap_or_else(|e| {
                    warn!("Cannot resolve '{}' ({}), using as-is", link.target_url, e);
                    link.target_url.clone()
                });
                BrandTask::new(link, url)
            })
            .collect();

        warn_on_slug_collisions(&tasks);
        Ok(tasks)
    }

    /// Start running `tasks` and return their completion stream.
    pub fn dispatch(&self, tasks: Vec<BrandTask>) -> CompletionStream {
        let brands: Vec<String> = tasks.iter().map(|t| t.brand().to_string()).collect();
        let worker_count = self.concurrency.min(tasks.len());

        let (job_tx, job_rx) = mpsc::unbounded_channel::<(usize, BrandTask)>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<(usize, TaskOutcome)>();

        for (index, task) in tasks.into_iter().enumerate() {
            info!("Submitting brand '{}' => {}", task.brand(), task.url());
            // Receiver is alive until the workers drain it
            let _ = job_tx.send((index, task));
        }
        drop(job_tx);

        let job_rx = Arc::new(Mutex::new(job_rx));
        let mut workers = Vec::with_capacity(worker_count);

        for _ in 0..worker_count {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let renderer = self.renderer.clone();
            let store = self.store.clone();

            workers.push(tokio::spawn(async move {
                loop {
                    let job = {
                        let mut rx = job_rx.lock().await;
                        rx.recv().await
                    };

                    let Some((index, task)) = job else {
                        break;
                    };

                    let outcome = run_isolated(task, renderer.clone(), store.clone()).await;
                    if result_tx.send((index, outcome)).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(result_tx);

        let barrier = tokio::spawn(async move {
            for worker in workers {
                if let Err(e) = worker.await {
                    warn!("Brand worker terminated abnormally: {}", e);
                }
            }
        });

        CompletionStream {
            receiver: result_rx,
            brands,
            barrier,
        }
    }
}

/// Outcomes of dispatched tasks as they complete.
pub struct CompletionStream {
    receiver: mpsc::UnboundedReceiver<(usize, TaskOutcome)>,
    brands: Vec<String>,
    barrier: JoinHandle<()>,
}

impl CompletionStream {
    /// Number of dispatched tasks.
    pub fn total(&self) -> usize {
        self.brands.len()
    }

    /// Wait for every task and return outcomes in submission order.
    pub async fn collect(self) -> Vec<TaskOutcome> {
        self.collect_with(|_| {}).await
    }

    /// Like [`collect`](Self::collect), calling `on_complete` for each
    /// outcome in the order tasks finish.
    ///
    /// A task whose worker died before reporting is recorded as a failure,
    /// so the summary always has one outcome per dispatched task.
    pub async fn collect_with<F>(mut self, mut on_complete: F) -> Vec<TaskOutcome>
    where
        F: FnMut(&TaskOutcome),
    {
        let mut slots: Vec<Option<TaskOutcome>> = vec![None; self.brands.len()];

        while let Some((index, outcome)) = self.receiver.recv().await {
            on_complete(&outcome);
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(outcome);
            }
        }

        if let Err(e) = self.barrier.await {
            warn!("Brand worker join failed: {}", e);
        }

        slots
            .into_iter()
            .zip(self.brands)
            .map(|(slot, brand)| {
                slot.unwrap_or_else(|| {
                    let outcome = TaskOutcome::Failure {
                        brand,
                        cause: "task aborted before reporting".to_string(),
                    };
                    on_complete(&outcome);
                    outcome
                })
            })
            .collect()
    }
}

/// Run one task on its own tokio task so a panic is reported as that
/// task's failure and the worker keeps draining the queue.
async fn run_isolated(
    mut task: BrandTask,
    renderer: Arc<dyn PageRenderer>,
    store: BrandStore,
) -> TaskOutcome {
    let brand = task.brand().to_string();
    let handle = tokio::spawn(async move { task.run(renderer.as_ref(), &store).await });

    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Brand '{}' aborted: {}", brand, e);
            TaskOutcome::Failure {
                brand,
                cause: if e.is_panic() {
                    "task panicked".to_string()
                } else {
                    "task cancelled".to_string()
                },
            }
        }
    }
}

/// Log every pair of matched brands that would write the same files.
fn warn_on_slug_collisions(tasks: &[BrandTask]) {
    let mut by_slug: HashMap<&str, &str> = HashMap::new();
    for task in tasks {
        if let Some(previous) = by_slug.insert(task.slug(), task.brand()) {
            warn!(
                "Brands '{}' and '{}' share slug '{}'; the last to finish overwrites the other",
                previous,
                task.brand(),
                task.slug()
            );
        }
    }
}
