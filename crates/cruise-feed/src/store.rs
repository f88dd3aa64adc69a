use std::sync::Arc;

use crate::{IngestedCruiseRecord, LineId, SailingReference};

/// Errors from the persistence collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The store cannot be reached at all. The one run-fatal failure
    /// mode: a run that cannot enumerate its scope moves to Failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store query failed: {0}")]
    Query(String),
}

/// Persistence collaborator, consumed through upsert-by-cruise-id and
/// scope enumeration. Implementations wrap each upsert in its own
/// transaction; one cruise's write failure must not roll back others.
#[async_trait::async_trait]
pub trait CruiseStore: Send + Sync {
    /// All known sailings under one local line.
    async fn sailings_for_line(&self, line: LineId) -> Result<Vec<SailingReference>, StoreError>;

    /// Sailings departing within the next `days` days.
    async fn sailings_in_window(&self, days: u32) -> Result<Vec<SailingReference>, StoreError>;

    /// Insert or update one cruise record, in its own transaction.
    async fn upsert(&self, record: &IngestedCruiseRecord) -> Result<(), StoreError>;

    /// Record that a line was just synced, for staleness reporting.
    async fn record_line_sync(&self, line: LineId) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<T: CruiseStore + ?Sized> CruiseStore for Arc<T> {
    async fn sailings_for_line(&self, line: LineId) -> Result<Vec<SailingReference>, StoreError> {
        (**self).sailings_for_line(line).await
    }

    async fn sailings_in_window(&self, days: u32) -> Result<Vec<SailingReference>, StoreError> {
        (**self).sailings_in_window(days).await
    }

    async fn upsert(&self, record: &IngestedCruiseRecord) -> Result<(), StoreError> {
        (**self).upsert(record).await
    }

    async fn record_line_sync(&self, line: LineId) -> Result<(), StoreError> {
        (**self).record_line_sync(line).await
    }
}
