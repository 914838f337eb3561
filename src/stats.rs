//! Pipeline counters
//!
//! Every request and record that the bridge drops is counted here so the
//! `/stats` endpoint shows what the always-200 ingest path hides.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Process-wide ingest and delivery counters
#[derive(Debug, Default)]
pub struct BridgeStats {
    requests_received: AtomicU64,
    requests_rejected: AtomicU64,
    records_processed: AtomicU64,
    records_persisted: AtomicU64,
    records_dropped: AtomicU64,
}

/// Point-in-time copy of [`BridgeStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub requests_received: u64,
    pub requests_rejected: u64,
    pub records_processed: u64,
    pub records_persisted: u64,
    pub records_dropped: u64,
}

impl BridgeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Request could not be decompressed or decoded
    pub fn record_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processed(&self, count: u64) {
        self.records_processed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_persisted(&self) {
        self.records_persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.records_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_received: self.requests_received.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            records_processed: self.records_processed.load(Ordering::Relaxed),
            records_persisted: self.records_persisted.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
        }
    }
}
