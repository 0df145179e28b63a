//! Batch submission with bounded retries.

use std::time::Duration;

use tokio_retry::RetryIf;

use crate::app::ProgressCounters;
use crate::error_handling::{get_retry_strategy, SinkError};
use crate::index::DocumentSink;
use crate::models::Document;

/// How often and how far apart a batch is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: usize,
    pub delay: Duration,
}

/// Result of submitting one batch.
#[derive(Debug)]
pub struct SubmitOutcome {
    /// Attempts actually made; fewer than `max_attempts` when a
    /// non-retriable error stopped the loop.
    pub attempts: usize,
    pub result: Result<(), SinkError>,
}

/// Submits `batch` to `sink` until it succeeds, a non-retriable error
/// occurs, or `policy.max_attempts` attempts have been made.
pub async fn submit_with_retry(
    sink: &dyn DocumentSink,
    batch: &[Document],
    policy: RetryPolicy,
    counters: &ProgressCounters,
) -> SubmitOutcome {
    let mut attempts = 0usize;
    let result = RetryIf::start(
        get_retry_strategy(policy.max_attempts, policy.delay),
        || {
            attempts += 1;
            counters.record_attempt();
            if attempts > 1 {
                log::debug!(
                    "Retrying batch of {} records (attempt {}/{})",
                    batch.len(),
                    attempts,
                    policy.max_attempts
                );
            }
            sink.add_documents(batch)
        },
        |e: &SinkError| {
            let retriable = e.is_retriable();
            if retriable {
                log::warn!("Batch submission to {} failed: {}", sink.name(), e);
            }
            retriable
        },
    )
    .await;

    SubmitOutcome { attempts, result }
}
