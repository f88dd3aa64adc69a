//! Fakes for exercising the downloader and orchestrator without a real
//! supplier, store, or cache.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::{
    CacheError, CruiseCache, CruiseId, CruiseStore, FetchError, FileFetcher,
    IngestedCruiseRecord, LineId, SailingReference, StoreError, SupplierPath,
};

/// A fetcher fed from a script of per-path responses.
///
/// `serve` registers a payload returned on every fetch of that path;
/// `push` queues a one-shot result consumed before the static payload,
/// which makes transient-then-success sequences easy to express.
/// Unknown paths return NotFound.
#[derive(Default)]
pub struct ScriptedFetcher {
    served: Mutex<HashMap<String, Vec<u8>>>,
    queued: Mutex<HashMap<String, VecDeque<Result<Vec<u8>, FetchError>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, path: &str, payload: impl Into<Vec<u8>>) {
        self.served
            .lock()
            .unwrap()
            .insert(path.to_owned(), payload.into());
    }

    pub fn push(&self, path: &str, result: Result<Vec<u8>, FetchError>) {
        self.queued
            .lock()
            .unwrap()
            .entry(path.to_owned())
            .or_default()
            .push_back(result);
    }

    /// Every path fetched, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FileFetcher for ScriptedFetcher {
    async fn fetch(&self, path: &SupplierPath) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(path.as_str().to_owned());

        if let Some(queue) = self.queued.lock().unwrap().get_mut(path.as_str())
            && let Some(result) = queue.pop_front()
        {
            return result;
        }

        match self.served.lock().unwrap().get(path.as_str()) {
            Some(payload) => Ok(payload.clone()),
            None => Err(FetchError::NotFound),
        }
    }
}

/// In-memory store fake. Seed sailings with `seed`, flip `fail_enumeration`
/// to simulate an unreachable store, and name cruise ids in `fail_upserts`
/// to make individual writes fail.
#[derive(Default)]
pub struct MemoryStore {
    sailings: Mutex<Vec<SailingReference>>,
    records: Mutex<HashMap<CruiseId, IngestedCruiseRecord>>,
    line_syncs: Mutex<Vec<LineId>>,
    fail_enumeration: Mutex<bool>,
    fail_upserts: Mutex<Vec<CruiseId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, sailing: SailingReference) {
        self.sailings.lock().unwrap().push(sailing);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.fail_enumeration.lock().unwrap() = unavailable;
    }

    pub fn fail_upsert_for(&self, cruise_id: CruiseId) {
        self.fail_upserts.lock().unwrap().push(cruise_id);
    }

    pub fn record(&self, cruise_id: &CruiseId) -> Option<IngestedCruiseRecord> {
        self.records.lock().unwrap().get(cruise_id).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn line_syncs(&self) -> Vec<LineId> {
        self.line_syncs.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CruiseStore for MemoryStore {
    async fn sailings_for_line(&self, line: LineId) -> Result<Vec<SailingReference>, StoreError> {
        if *self.fail_enumeration.lock().unwrap() {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(self
            .sailings
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.line_id == line)
            .cloned()
            .collect())
    }

    async fn sailings_in_window(&self, _days: u32) -> Result<Vec<SailingReference>, StoreError> {
        if *self.fail_enumeration.lock().unwrap() {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(self.sailings.lock().unwrap().clone())
    }

    async fn upsert(&self, record: &IngestedCruiseRecord) -> Result<(), StoreError> {
        if self.fail_upserts.lock().unwrap().contains(&record.cruise_id) {
            return Err(StoreError::Query("disk I/O error".into()));
        }
        self.records
            .lock()
            .unwrap()
            .insert(record.cruise_id.clone(), record.clone());
        Ok(())
    }

    async fn record_line_sync(&self, line: LineId) -> Result<(), StoreError> {
        self.line_syncs.lock().unwrap().push(line);
        Ok(())
    }
}

/// Cache fake that records every invalidation key.
#[derive(Default)]
pub struct RecordingCache {
    invalidated: Mutex<Vec<String>>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidated(&self) -> Vec<String> {
        self.invalidated.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CruiseCache for RecordingCache {
    async fn invalidate_cruise(&self, cruise_id: &CruiseId) -> Result<(), CacheError> {
        self.invalidated
            .lock()
            .unwrap()
            .push(format!("cruise:{cruise_id}"));
        Ok(())
    }

    async fn invalidate_line(&self, line: LineId) -> Result<(), CacheError> {
        self.invalidated
            .lock()
            .unwrap()
            .push(format!("cruiseline:{line}"));
        Ok(())
    }
}
