use std::fmt;
use std::time::{Duration, Instant, SystemTime};

use crate::{CruiseId, DownloadOutcome, OutcomeStatus};

/// Stage of the pipeline a warning was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnStage {
    Parse,
    Persist,
    Cache,
}

impl fmt::Display for WarnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => f.write_str("parse"),
            Self::Persist => f.write_str("persist"),
            Self::Cache => f.write_str("cache"),
        }
    }
}

/// A per-cruise note attached to the run report. The library never prints
/// these; callers decide how to present them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunWarning {
    pub cruise_id: CruiseId,
    pub stage: WarnStage,
    pub message: String,
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: skipping {}: {}", self.stage, self.cruise_id, self.message)
    }
}

/// Aggregate counters for one sync run. Updated as outcomes arrive, so a
/// crash mid-run leaves a best-effort partial picture in the logs; the
/// only state that outlives the run.
#[derive(Debug, Clone)]
pub struct SyncRunSummary {
    pub scope: String,
    pub total_attempted: u64,
    pub succeeded: u64,
    pub not_found: u64,
    pub failed: u64,
    pub parse_failures: u64,
    pub persist_failures: u64,
    pub started_at: SystemTime,
    pub finished_at: Option<SystemTime>,
    pub warnings: Vec<RunWarning>,
    started: Instant,
    elapsed: Option<Duration>,
}

impl SyncRunSummary {
    pub fn start(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            total_attempted: 0,
            succeeded: 0,
            not_found: 0,
            failed: 0,
            parse_failures: 0,
            persist_failures: 0,
            started_at: SystemTime::now(),
            finished_at: None,
            warnings: Vec::new(),
            started: Instant::now(),
            elapsed: None,
        }
    }

    /// Fold one terminal download outcome into the counters.
    pub fn record_outcome(&mut self, outcome: &DownloadOutcome) {
        self.total_attempted += 1;
        match outcome.status {
            OutcomeStatus::Success => self.succeeded += 1,
            OutcomeStatus::NotFound => self.not_found += 1,
            OutcomeStatus::Failed | OutcomeStatus::Fatal => self.failed += 1,
        }
    }

    pub fn record_parse_failure(&mut self, cruise_id: CruiseId, message: impl Into<String>) {
        self.parse_failures += 1;
        self.warnings.push(RunWarning {
            cruise_id,
            stage: WarnStage::Parse,
            message: message.into(),
        });
    }

    pub fn record_persist_failure(&mut self, cruise_id: CruiseId, message: impl Into<String>) {
        self.persist_failures += 1;
        self.warnings.push(RunWarning {
            cruise_id,
            stage: WarnStage::Persist,
            message: message.into(),
        });
    }

    pub fn record_cache_warning(&mut self, cruise_id: CruiseId, message: impl Into<String>) {
        self.warnings.push(RunWarning {
            cruise_id,
            stage: WarnStage::Cache,
            message: message.into(),
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(SystemTime::now());
        self.elapsed = Some(self.started.elapsed());
    }

    /// Wall-clock time of the run so far, or of the whole run once
    /// finished.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.unwrap_or_else(|| self.started.elapsed())
    }
}

impl fmt::Display for SyncRunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} attempted, {} succeeded, {} not found, {} failed, {} parse failures, {} persist failures in {:.1}s",
            self.scope,
            self.total_attempted,
            self.succeeded,
            self.not_found,
            self.failed,
            self.parse_failures,
            self.persist_failures,
            self.elapsed().as_secs_f64(),
        )
    }
}
