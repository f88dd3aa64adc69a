use std::collections::HashMap;
use std::sync::Mutex;

use cruise_feed::{CacheError, CruiseCache, CruiseId, LineId};

/// Keyed in-process cache.
///
/// Keys follow the platform's cache naming: `cruise:{cruiseId}` for a
/// single sailing's priced inventory, `cruiseline:{lineId}` for per-line
/// aggregates. Invalidation removes exactly the named keys; there is no
/// flush-all operation.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
    invalidations: Mutex<Vec<String>>,
}

pub fn cruise_key(cruise_id: &CruiseId) -> String {
    format!("cruise:{cruise_id}")
}

pub fn line_key(line: LineId) -> String {
    format!("cruiseline:{line}")
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.lock().unwrap().insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Every key invalidated so far, in order.
    pub fn invalidations(&self) -> Vec<String> {
        self.invalidations.lock().unwrap().clone()
    }

    fn drop_key(&self, key: String) {
        self.entries.lock().unwrap().remove(&key);
        self.invalidations.lock().unwrap().push(key);
    }
}

#[async_trait::async_trait]
impl CruiseCache for MemoryCache {
    async fn invalidate_cruise(&self, cruise_id: &CruiseId) -> Result<(), CacheError> {
        self.drop_key(cruise_key(cruise_id));
        Ok(())
    }

    async fn invalidate_line(&self, line: LineId) -> Result<(), CacheError> {
        self.drop_key(line_key(line));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalidation_removes_only_the_named_key() {
        let cache = MemoryCache::new();
        cache.put("cruise:1001", "cached pricing");
        cache.put("cruise:1002", "cached pricing");
        cache.put("cruiseline:3", "cached line aggregate");

        cache
            .invalidate_cruise(&CruiseId::new("1001"))
            .await
            .unwrap();

        assert!(cache.get("cruise:1001").is_none());
        assert!(cache.get("cruise:1002").is_some());
        assert!(cache.get("cruiseline:3").is_some());
    }

    #[tokio::test]
    async fn line_invalidation_uses_line_key() {
        let cache = MemoryCache::new();
        cache.put("cruiseline:3", "cached line aggregate");

        cache.invalidate_line(LineId::new(3)).await.unwrap();

        assert!(cache.get("cruiseline:3").is_none());
        assert_eq!(cache.invalidations(), vec!["cruiseline:3".to_owned()]);
    }
}
