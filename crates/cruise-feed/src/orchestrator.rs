use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    BulkDownloader, CruiseCache, CruiseId, CruiseStore, DownloadTarget, DownloaderConfig,
    FileFetcher, IngestionParser, LineId, LineIdMap, PathResolver, Scope, StoreError,
    SyncRunSummary,
};

/// Phase of a sync run, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Enumerating,
    Downloading,
    Persisting,
    CacheInvalidating,
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enumerating => f.write_str("enumerating"),
            Self::Downloading => f.write_str("downloading"),
            Self::Persisting => f.write_str("persisting"),
            Self::CacheInvalidating => f.write_str("cache-invalidating"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// The one run-fatal error: everything else is folded into the summary.
#[derive(Debug, thiserror::Error)]
pub enum SyncRunError {
    #[error("cannot enumerate sync scope: {0}")]
    StoreUnavailable(String),
}

/// Top-level coordinator for one sync run.
///
/// Given a scope it enumerates target sailings from the store, bulk
/// downloads their supplier files, parses and persists each record in its
/// own transaction, and invalidates the affected cache keys. Per-cruise
/// failures are recovered locally and folded into the summary; only an
/// unreachable store aborts the run.
pub struct SyncOrchestrator<F, S, C> {
    fetcher: Arc<F>,
    store: Arc<S>,
    cache: Arc<C>,
    line_map: Arc<LineIdMap>,
    downloader_config: DownloaderConfig,
}

impl<F, S, C> SyncOrchestrator<F, S, C>
where
    F: FileFetcher + 'static,
    S: CruiseStore,
    C: CruiseCache,
{
    pub fn new(
        fetcher: Arc<F>,
        store: Arc<S>,
        cache: Arc<C>,
        line_map: Arc<LineIdMap>,
        downloader_config: DownloaderConfig,
    ) -> Self {
        Self {
            fetcher,
            store,
            cache,
            line_map,
            downloader_config,
        }
    }

    /// Run a full sync for the scope without external cancellation.
    pub async fn run(&self, scope: Scope) -> Result<SyncRunSummary, SyncRunError> {
        let (_tx, cancel) = watch::channel(false);
        self.run_until(scope, cancel).await
    }

    /// Run a full sync, stopping early (but cleanly) if the cancel signal
    /// flips to true. Records persisted before cancellation stay persisted.
    pub async fn run_until(
        &self,
        scope: Scope,
        cancel: watch::Receiver<bool>,
    ) -> Result<SyncRunSummary, SyncRunError> {
        let mut summary = SyncRunSummary::start(scope.describe());
        tracing::info!(scope = %scope, phase = %RunPhase::Enumerating, "sync run starting");

        let targets = match self.enumerate(&scope).await {
            Ok(targets) => targets,
            Err(e) => {
                tracing::error!(scope = %scope, phase = %RunPhase::Failed, error = %e, "sync run failed");
                return Err(SyncRunError::StoreUnavailable(e.to_string()));
            }
        };

        tracing::info!(
            scope = %scope,
            phase = %RunPhase::Downloading,
            targets = targets.len(),
            "targets enumerated"
        );

        let downloader = BulkDownloader::new(
            Arc::clone(&self.fetcher),
            PathResolver::new(Arc::clone(&self.line_map)),
            self.downloader_config.clone(),
        );
        let outcomes = downloader.run_until(targets, &mut summary, cancel).await;

        tracing::info!(scope = %scope, phase = %RunPhase::Persisting, "downloads complete");

        let parser = IngestionParser::new(Arc::clone(&self.line_map));
        let mut affected_cruises: Vec<CruiseId> = Vec::new();
        let mut affected_lines: BTreeSet<LineId> = BTreeSet::new();

        for outcome in &outcomes {
            let Some(payload) = outcome.payload.as_deref() else {
                continue;
            };

            let record = match parser.parse(payload) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(cruise_id = %outcome.cruise_id, error = %e, "rejecting supplier payload");
                    summary.record_parse_failure(outcome.cruise_id.clone(), e.to_string());
                    continue;
                }
            };

            // One transaction per record: a failed write skips this cruise
            // only, and it will be retried on the next run.
            if let Err(e) = self.store.upsert(&record).await {
                tracing::warn!(cruise_id = %record.cruise_id, error = %e, "persist failed");
                summary.record_persist_failure(record.cruise_id.clone(), e.to_string());
                continue;
            }

            affected_lines.insert(record.line_id);
            affected_cruises.push(record.cruise_id);
        }

        tracing::info!(
            scope = %scope,
            phase = %RunPhase::CacheInvalidating,
            cruises = affected_cruises.len(),
            lines = affected_lines.len(),
            "persist complete"
        );

        for cruise_id in &affected_cruises {
            if let Err(e) = self.cache.invalidate_cruise(cruise_id).await {
                tracing::warn!(cruise_id = %cruise_id, error = %e, "cache invalidation failed");
                summary.record_cache_warning(cruise_id.clone(), e.to_string());
            }
        }
        for line in &affected_lines {
            if let Err(e) = self.cache.invalidate_line(*line).await {
                tracing::warn!(line_id = %line, error = %e, "cache invalidation failed");
            }
            // Best-effort bookkeeping; staleness reporting only.
            if let Err(e) = self.store.record_line_sync(*line).await {
                tracing::warn!(line_id = %line, error = %e, "could not record line sync time");
            }
        }

        summary.finish();
        tracing::info!(phase = %RunPhase::Done, summary = %summary, "sync run finished");
        Ok(summary)
    }

    async fn enumerate(&self, scope: &Scope) -> Result<Vec<DownloadTarget>, StoreError> {
        match scope {
            Scope::Line(line) => Ok(self
                .store
                .sailings_for_line(*line)
                .await?
                .into_iter()
                .map(DownloadTarget::resolve)
                .collect()),
            Scope::Recent { days } => Ok(self
                .store
                .sailings_in_window(*days)
                .await?
                .into_iter()
                .map(DownloadTarget::resolve)
                .collect()),
            Scope::Paths(targets) => Ok(targets.clone()),
        }
    }
}
