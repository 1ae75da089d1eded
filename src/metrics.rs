//! Lightweight global metrics for SideMeta.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - Side-channel streams
//! - Metadata cache
//! - Attribute restore
//! - Batches

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Streams -----
static STREAM_READS: AtomicU64 = AtomicU64::new(0);
static STREAM_WRITES: AtomicU64 = AtomicU64::new(0);
static STREAM_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static STREAM_DELETES: AtomicU64 = AtomicU64::new(0);

// ----- Cache -----
static CACHE_HITS: AtomicU64 = AtomicU64::new(0);
static CACHE_MISSES: AtomicU64 = AtomicU64::new(0);
static CACHE_STALE_EVICTIONS: AtomicU64 = AtomicU64::new(0);

// ----- Attributes -----
static ATTR_RESTORES: AtomicU64 = AtomicU64::new(0);
static ATTR_RESTORE_FAILURES: AtomicU64 = AtomicU64::new(0);

// ----- Batches -----
static BATCH_ABORTS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    // Streams
    pub stream_reads: u64,
    pub stream_writes: u64,
    pub stream_bytes_written: u64,
    pub stream_deletes: u64,

    // Cache
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_stale_evictions: u64,

    // Attributes
    pub attr_restores: u64,
    pub attr_restore_failures: u64,

    // Batches
    pub batch_aborts: u64,
}

impl MetricsSnapshot {
    pub fn cache_hit_ratio(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

// ----- Recorders (Streams) -----
pub fn record_stream_read() {
    STREAM_READS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_stream_write(bytes: usize) {
    STREAM_WRITES.fetch_add(1, Ordering::Relaxed);
    STREAM_BYTES_WRITTEN.fetch_add(bytes as u64, Ordering::Relaxed);
}

pub fn record_stream_delete() {
    STREAM_DELETES.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Cache) -----
pub fn record_cache_hit() {
    CACHE_HITS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_cache_miss() {
    CACHE_MISSES.fetch_add(1, Ordering::Relaxed);
}
pub fn record_cache_stale_eviction() {
    CACHE_STALE_EVICTIONS.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Attributes) -----
pub fn record_attr_restore(ok: bool) {
    ATTR_RESTORES.fetch_add(1, Ordering::Relaxed);
    if !ok {
        ATTR_RESTORE_FAILURES.fetch_add(1, Ordering::Relaxed);
    }
}

// ----- Recorders (Batches) -----
pub fn record_batch_abort() {
    BATCH_ABORTS.fetch_add(1, Ordering::Relaxed);
}

// ----- Snapshot / reset -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        stream_reads: STREAM_READS.load(Ordering::Relaxed),
        stream_writes: STREAM_WRITES.load(Ordering::Relaxed),
        stream_bytes_written: STREAM_BYTES_WRITTEN.load(Ordering::Relaxed),
        stream_deletes: STREAM_DELETES.load(Ordering::Relaxed),

        cache_hits: CACHE_HITS.load(Ordering::Relaxed),
        cache_misses: CACHE_MISSES.load(Ordering::Relaxed),
        cache_stale_evictions: CACHE_STALE_EVICTIONS.load(Ordering::Relaxed),

        attr_restores: ATTR_RESTORES.load(Ordering::Relaxed),
        attr_restore_failures: ATTR_RESTORE_FAILURES.load(Ordering::Relaxed),

        batch_aborts: BATCH_ABORTS.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    for c in [
        &STREAM_READS,
        &STREAM_WRITES,
        &STREAM_BYTES_WRITTEN,
        &STREAM_DELETES,
        &CACHE_HITS,
        &CACHE_MISSES,
        &CACHE_STALE_EVICTIONS,
        &ATTR_RESTORES,
        &ATTR_RESTORE_FAILURES,
        &BATCH_ABORTS,
    ] {
        c.store(0, Ordering::Relaxed);
    }
}
