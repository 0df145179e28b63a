//! Progress accounting and periodic progress logging.

use log::{info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::memory::MemoryProbe;

/// Counters of one import run.
///
/// Owned by the run and shared with its workers through an `Arc`; two runs in
/// the same process never share counters. All updates are additive atomics.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    records_indexed: AtomicU64,
    batches_indexed: AtomicU64,
    records_abandoned: AtomicU64,
    batches_abandoned: AtomicU64,
    batches_dispatched: AtomicU64,
    submission_attempts: AtomicU64,
    lines_read: AtomicU64,
    lines_skipped: AtomicU64,
}

/// Point-in-time copy of [`ProgressCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub records_indexed: u64,
    pub batches_indexed: u64,
    pub records_abandoned: u64,
    pub batches_abandoned: u64,
    pub batches_dispatched: u64,
    pub submission_attempts: u64,
    pub lines_read: u64,
    pub lines_skipped: u64,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successfully indexed batch and returns `(previous, new)`
    /// record totals.
    pub fn record_indexed(&self, records: u64) -> (u64, u64) {
        self.batches_indexed.fetch_add(1, Ordering::Relaxed);
        let previous = self.records_indexed.fetch_add(records, Ordering::SeqCst);
        (previous, previous + records)
    }

    pub fn record_abandoned(&self, records: u64) {
        self.batches_abandoned.fetch_add(1, Ordering::Relaxed);
        self.records_abandoned.fetch_add(records, Ordering::SeqCst);
    }

    pub fn record_dispatched(&self) {
        self.batches_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attempt(&self) {
        self.submission_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_line(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_line(&self) {
        self.lines_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn records_indexed(&self) -> u64 {
        self.records_indexed.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            records_indexed: self.records_indexed.load(Ordering::SeqCst),
            batches_indexed: self.batches_indexed.load(Ordering::SeqCst),
            records_abandoned: self.records_abandoned.load(Ordering::SeqCst),
            batches_abandoned: self.batches_abandoned.load(Ordering::SeqCst),
            batches_dispatched: self.batches_dispatched.load(Ordering::SeqCst),
            submission_attempts: self.submission_attempts.load(Ordering::SeqCst),
            lines_read: self.lines_read.load(Ordering::SeqCst),
            lines_skipped: self.lines_skipped.load(Ordering::SeqCst),
        }
    }
}

/// Whether going from `previous` to `current` passed a multiple of `interval`.
///
/// Batches rarely land exactly on a multiple, so an equality test on the new
/// total would stay silent for most batch sizes.
pub fn crossed_interval(previous: u64, current: u64, interval: u64) -> bool {
    interval > 0 && previous / interval != current / interval
}

/// Logs indexed records, throughput, and current memory usage.
pub fn log_progress(start_time: Instant, counters: &ProgressCounters, memory: &MemoryProbe) {
    let indexed = counters.records_indexed();
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        indexed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Processed {} records in {:.2} seconds (~{:.0} records/sec)",
        indexed, elapsed_secs, rate
    );
    match memory.rss_mb() {
        Some(mb) => info!("Memory usage by this process: {} MB", mb),
        None => warn!("Could not retrieve memory usage of this process"),
    }
}
