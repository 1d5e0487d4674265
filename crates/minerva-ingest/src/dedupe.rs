//! In-memory deduplication of source IPs within a single run.
//!
//! The set only guards the enrichment queue: an IP enters the queue at most
//! once per run. Cross-run deduplication is the store's job (`ip_geo`
//! membership), so nothing here is persisted.

use std::collections::HashSet;

use parking_lot::Mutex;

/// Concurrent set of source IPs already considered for enrichment.
///
/// Thread-safe: share across workers via `Arc<DedupeSet>`.
#[derive(Debug, Default)]
pub struct DedupeSet {
    seen: Mutex<HashSet<String>>,
}

impl DedupeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `ip`, returning whether it was already present.
    ///
    /// The test and the insert happen under one lock, so exactly one caller
    /// observes `false` for any given IP.
    pub fn test_and_insert(&self, ip: &str) -> bool {
        let mut seen = self.seen.lock();
        if seen.contains(ip) {
            return true;
        }
        seen.insert(ip.to_string());
        false
    }

    /// Number of distinct IPs seen so far.
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// Whether no IP has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}
