use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the client's request policy
#[derive(Debug, Default)]
pub struct ClientStats {
    network_calls: AtomicU64,
    probes: AtomicU64,
    cache_hits: AtomicU64,
    stale_fallbacks: AtomicU64,
    rate_limited: AtomicU64,
    not_found: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of [`ClientStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClientStatsSnapshot {
    pub network_calls: u64,
    pub probes: u64,
    pub cache_hits: u64,
    pub stale_fallbacks: u64,
    pub rate_limited: u64,
    pub not_found: u64,
    pub failures: u64,
    pub deduplicated: u64,
}

impl ClientStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_network_calls(&self) {
        self.network_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_probes(&self) {
        self.probes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_stale_fallbacks(&self) {
        self.stale_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// `deduplicated` comes from the throttler, which owns that count.
    pub fn snapshot(&self, deduplicated: u64) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            network_calls: self.network_calls.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            stale_fallbacks: self.stale_fallbacks.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            deduplicated,
        }
    }
}
