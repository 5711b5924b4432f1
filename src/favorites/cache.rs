use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Client-side queries whose cached results depend on favorite state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    IsSaved(String),
    SavedList,
    SavedIds,
}

#[derive(Debug, Default, Clone, Copy)]
struct Entry {
    fresh: bool,
    invalidations: usize,
}

/// Freshness bookkeeping for cached queries; stale queries get refetched
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mark_fresh(&self, key: QueryKey) {
        self.entries().entry(key).or_default().fresh = true;
    }

    pub fn invalidate(&self, key: QueryKey) {
        let mut entries = self.entries();
        let entry = entries.entry(key).or_default();
        entry.fresh = false;
        entry.invalidations += 1;
    }

    /// Queries never fetched count as stale.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries().get(key).map_or(true, |entry| !entry.fresh)
    }

    pub fn invalidation_count(&self, key: &QueryKey) -> usize {
        self.entries().get(key).map_or(0, |entry| entry.invalidations)
    }
}
