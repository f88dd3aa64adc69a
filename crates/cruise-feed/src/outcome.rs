use crate::{CruiseId, SupplierPath};

/// Terminal result of one sailing's download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// A candidate path resolved and the payload was retrieved.
    Success,
    /// Every candidate path came back missing.
    NotFound,
    /// A transient failure survived all retries.
    Failed,
    /// The reference could not be resolved to any path (no ship id);
    /// recorded without network I/O.
    Fatal,
}

/// Per-sailing download result, consumed immediately by the parser and
/// then discarded; only aggregate counts outlive the run.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub cruise_id: CruiseId,
    /// Every path tried, in the order tried.
    pub attempted: Vec<SupplierPath>,
    /// The path that won, on success.
    pub resolved: Option<SupplierPath>,
    pub status: OutcomeStatus,
    pub payload: Option<Vec<u8>>,
    pub error: Option<String>,
}

impl DownloadOutcome {
    pub fn success(
        cruise_id: CruiseId,
        attempted: Vec<SupplierPath>,
        resolved: SupplierPath,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            cruise_id,
            attempted,
            resolved: Some(resolved),
            status: OutcomeStatus::Success,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn not_found(cruise_id: CruiseId, attempted: Vec<SupplierPath>) -> Self {
        Self {
            cruise_id,
            attempted,
            resolved: None,
            status: OutcomeStatus::NotFound,
            payload: None,
            error: None,
        }
    }

    pub fn failed(cruise_id: CruiseId, attempted: Vec<SupplierPath>, error: String) -> Self {
        Self {
            cruise_id,
            attempted,
            resolved: None,
            status: OutcomeStatus::Failed,
            payload: None,
            error: Some(error),
        }
    }

    pub fn fatal(cruise_id: CruiseId, error: String) -> Self {
        Self {
            cruise_id,
            attempted: Vec::new(),
            resolved: None,
            status: OutcomeStatus::Fatal,
            payload: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
