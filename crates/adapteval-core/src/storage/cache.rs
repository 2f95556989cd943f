use crate::model::RatedPair;
use moka::sync::Cache;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Read-through cache of each rater's already-rated (question, agent)
/// set. Entries expire after the configured TTL; every write for a
/// rater invalidates that rater's entry, so a rater can never race
/// their own submissions. Two raters converging on the same unrated
/// pair within the TTL window remains possible, as documented.
pub struct RatedPairsCache {
    inner: Cache<String, Arc<HashSet<RatedPair>>>,
}

impl RatedPairsCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn get(&self, user_id: &str) -> Option<Arc<HashSet<RatedPair>>> {
        self.inner.get(user_id)
    }

    pub fn insert(&self, user_id: String, pairs: Arc<HashSet<RatedPair>>) {
        self.inner.insert(user_id, pairs);
    }

    pub fn invalidate(&self, user_id: &str) {
        self.inner.invalidate(user_id);
    }
}
