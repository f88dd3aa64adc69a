use std::sync::Arc;

use crate::{CruiseId, LineId};

#[derive(Debug, Clone, thiserror::Error)]
#[error("cache backend error: {0}")]
pub struct CacheError(pub String);

/// Cache collaborator. Invalidation is always keyed, by cruise or by
/// line; there is no flush-all operation.
#[async_trait::async_trait]
pub trait CruiseCache: Send + Sync {
    async fn invalidate_cruise(&self, cruise_id: &CruiseId) -> Result<(), CacheError>;

    async fn invalidate_line(&self, line: LineId) -> Result<(), CacheError>;
}

#[async_trait::async_trait]
impl<T: CruiseCache + ?Sized> CruiseCache for Arc<T> {
    async fn invalidate_cruise(&self, cruise_id: &CruiseId) -> Result<(), CacheError> {
        (**self).invalidate_cruise(cruise_id).await
    }

    async fn invalidate_line(&self, line: LineId) -> Result<(), CacheError> {
        (**self).invalidate_line(line).await
    }
}
