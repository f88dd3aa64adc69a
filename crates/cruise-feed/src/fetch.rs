use std::sync::Arc;

use crate::SupplierPath;

/// Errors from a single remote file retrieval.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The supplier has no file at this path. Not retried; the caller
    /// advances to the next candidate path instead.
    #[error("file not found")]
    NotFound,

    /// Connection, timeout, or server-side failure. Eligible for retry
    /// with backoff.
    #[error("transient error: {0}")]
    Transient(String),
}

/// Retrieves a single supplier file by resolved path.
///
/// Implementations perform direct file access only — no directory
/// listing or traversal — with a bounded per-attempt timeout.
#[async_trait::async_trait]
pub trait FileFetcher: Send + Sync {
    async fn fetch(&self, path: &SupplierPath) -> Result<Vec<u8>, FetchError>;
}

#[async_trait::async_trait]
impl<T: FileFetcher + ?Sized> FileFetcher for Arc<T> {
    async fn fetch(&self, path: &SupplierPath) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(path).await
    }
}
