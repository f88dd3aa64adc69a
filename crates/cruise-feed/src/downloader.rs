use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, mpsc, watch};

use crate::{
    DownloadOutcome, DownloadTarget, FetchError, FileFetcher, PathResolver, RetryConfig,
    SupplierPath, SyncRunSummary,
};

/// Sizing and retry policy for a bulk download run.
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Worker count; bounds concurrent connections to the supplier.
    pub workers: usize,
    /// Bound on the work queue. Producers block when it is full, so
    /// enumerating a very large scope cannot grow memory without bound.
    pub queue_depth: usize,
    pub retry: RetryConfig,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            queue_depth: 64,
            retry: RetryConfig::default(),
        }
    }
}

/// Drives the fetcher over a set of download targets with a fixed-size
/// worker pool, emitting exactly one terminal [`DownloadOutcome`] per
/// target. One bad file never blocks the batch.
pub struct BulkDownloader<F> {
    fetcher: Arc<F>,
    resolver: PathResolver,
    config: DownloaderConfig,
}

impl<F: FileFetcher + 'static> BulkDownloader<F> {
    pub fn new(fetcher: Arc<F>, resolver: PathResolver, config: DownloaderConfig) -> Self {
        Self {
            fetcher,
            resolver,
            config,
        }
    }

    /// Run without external cancellation.
    pub async fn run(
        &self,
        targets: Vec<DownloadTarget>,
        summary: &mut SyncRunSummary,
    ) -> Vec<DownloadOutcome> {
        let (_tx, cancel) = watch::channel(false);
        self.run_until(targets, summary, cancel).await
    }

    /// Run until all targets have a terminal outcome or the cancel signal
    /// flips to true. Cancellation stops enqueuing new work; in-flight
    /// fetches finish or time out naturally, and their outcomes are still
    /// recorded.
    pub async fn run_until(
        &self,
        targets: Vec<DownloadTarget>,
        summary: &mut SyncRunSummary,
        cancel: watch::Receiver<bool>,
    ) -> Vec<DownloadOutcome> {
        let workers = self.config.workers.max(1);
        let queue_depth = self.config.queue_depth.max(1);
        let total = targets.len();

        let (work_tx, work_rx) = mpsc::channel::<DownloadTarget>(queue_depth);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<DownloadOutcome>(queue_depth);

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let work_rx = Arc::clone(&work_rx);
            let outcome_tx = outcome_tx.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let resolver = self.resolver.clone();
            let retry = self.config.retry.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    // Hold the lock only long enough to claim a target.
                    let target = { work_rx.lock().await.recv().await };
                    let Some(target) = target else { break };

                    let outcome = download_one(&*fetcher, &resolver, &retry, target).await;
                    if outcome_tx.send(outcome).await.is_err() {
                        break;
                    }
                }
            }));
        }
        drop(outcome_tx);

        let producer = tokio::spawn(async move {
            let mut enqueued = 0usize;
            for target in targets {
                if *cancel.borrow() {
                    tracing::info!(enqueued, "cancellation requested, draining in-flight work");
                    break;
                }
                if work_tx.send(target).await.is_err() {
                    break;
                }
                enqueued += 1;
            }
        });

        // Single aggregator: workers send outcomes over the channel, only
        // this loop touches the summary.
        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = outcome_rx.recv().await {
            summary.record_outcome(&outcome);
            outcomes.push(outcome);
        }

        let _ = producer.await;
        for handle in handles {
            let _ = handle.await;
        }

        outcomes
    }
}

/// Resolve and fetch one sailing, trying candidate paths in priority
/// order. NotFound advances to the next candidate immediately; a
/// transient failure that survives its retries fails the sailing without
/// touching later candidates, so a supplier outage does not read as a
/// wave of spurious not-founds.
async fn download_one<F: FileFetcher>(
    fetcher: &F,
    resolver: &PathResolver,
    retry: &RetryConfig,
    target: DownloadTarget,
) -> DownloadOutcome {
    let cruise_id = target.sailing.cruise_id.clone();

    let candidates = match target.fixed_path {
        Some(path) => vec![path],
        None => resolver.candidate_paths(&target.sailing),
    };

    if candidates.is_empty() {
        tracing::warn!(cruise_id = %cruise_id, "sailing reference is unresolvable, skipping fetch");
        return DownloadOutcome::fatal(
            cruise_id,
            "sailing reference has no resolvable supplier path".to_owned(),
        );
    }

    let mut attempted = Vec::with_capacity(candidates.len());
    for path in candidates {
        attempted.push(path.clone());
        match fetch_with_retry(fetcher, &path, retry).await {
            Ok(payload) => {
                return DownloadOutcome::success(cruise_id, attempted, path, payload);
            }
            Err(FetchError::NotFound) => continue,
            Err(FetchError::Transient(error)) => {
                return DownloadOutcome::failed(cruise_id, attempted, error);
            }
        }
    }

    DownloadOutcome::not_found(cruise_id, attempted)
}

/// Fetch one path, retrying transient failures with exponential backoff.
/// NotFound is terminal for the path and returns immediately.
async fn fetch_with_retry<F: FileFetcher>(
    fetcher: &F,
    path: &SupplierPath,
    retry: &RetryConfig,
) -> Result<Vec<u8>, FetchError> {
    let mut attempt = 1u32;
    loop {
        let started = Instant::now();
        match fetcher.fetch(path).await {
            Ok(payload) => return Ok(payload),
            Err(FetchError::NotFound) => return Err(FetchError::NotFound),
            Err(FetchError::Transient(error)) => {
                if attempt >= retry.max_attempts.max(1) {
                    return Err(FetchError::Transient(error));
                }
                let delay = retry.delay_for(attempt);
                tracing::debug!(
                    path = %path,
                    attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "transient fetch failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
