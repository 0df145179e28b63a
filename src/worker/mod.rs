//! Worker pool that pulls batches from the distribution channel and submits
//! them to the index sink.

mod submit;

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::app::{crossed_interval, log_progress, MemoryProbe, ProgressCounters};
use crate::config::FailedBatchPolicy;
use crate::error_handling::PipelineError;
use crate::index::{DeadLetterWriter, DocumentSink};
use crate::models::Batch;

pub use submit::{submit_with_retry, RetryPolicy};

/// Tunables shared by every worker of a run.
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    pub retry: RetryPolicy,
    /// Pause after each batch, whatever its outcome.
    pub batch_interval: Duration,
    /// Progress is logged each time the indexed total crosses a multiple of this.
    pub log_interval: u64,
    pub failed_batches: FailedBatchPolicy,
}

/// Everything a worker needs, shared behind one `Arc`.
pub struct WorkerContext {
    pub sink: Arc<dyn DocumentSink>,
    pub counters: Arc<ProgressCounters>,
    pub memory: Arc<MemoryProbe>,
    pub dead_letter: Option<Arc<DeadLetterWriter>>,
    pub settings: WorkerSettings,
    /// Cancelled by a worker applying the fail-fast policy.
    pub cancel: CancellationToken,
    pub start_time: Instant,
}

/// Spawns `count` workers draining `rx`.
///
/// Each worker ends once every sender is dropped and the channel is empty,
/// or early with an error when a fail-fast policy triggers.
pub fn spawn_workers(
    count: usize,
    rx: flume::Receiver<Batch>,
    ctx: Arc<WorkerContext>,
) -> Vec<JoinHandle<Result<(), PipelineError>>> {
    (0..count)
        .map(|worker_id| tokio::spawn(run_worker(worker_id, rx.clone(), Arc::clone(&ctx))))
        .collect()
}

async fn run_worker(
    worker_id: usize,
    rx: flume::Receiver<Batch>,
    ctx: Arc<WorkerContext>,
) -> Result<(), PipelineError> {
    debug!("Worker {} started", worker_id);

    while let Ok(batch) = rx.recv_async().await {
        let result = process_batch(worker_id, &batch, &ctx).await;

        if !ctx.settings.batch_interval.is_zero() {
            tokio::time::sleep(ctx.settings.batch_interval).await;
        }

        if let Err(e) = result {
            error!("Worker {} stopping: {}", worker_id, e);
            ctx.cancel.cancel();
            return Err(e);
        }
    }

    debug!("Worker {} finished, channel drained", worker_id);
    Ok(())
}

async fn process_batch(
    worker_id: usize,
    batch: &Batch,
    ctx: &WorkerContext,
) -> Result<(), PipelineError> {
    let records = batch.len();
    let outcome =
        submit_with_retry(ctx.sink.as_ref(), batch, ctx.settings.retry, &ctx.counters).await;

    let source = match outcome.result {
        Ok(()) => {
            let (previous, total) = ctx.counters.record_indexed(records as u64);
            debug!(
                "Worker {} indexed {} records ({} total)",
                worker_id, records, total
            );
            if crossed_interval(previous, total, ctx.settings.log_interval) {
                log_progress(ctx.start_time, &ctx.counters, &ctx.memory);
            }
            return Ok(());
        }
        Err(e) => e,
    };

    ctx.counters.record_abandoned(records as u64);
    match ctx.settings.failed_batches {
        FailedBatchPolicy::Drop => {
            error!(
                "Dropping batch of {} records after {} attempt(s) to {}: {}",
                records,
                outcome.attempts,
                ctx.sink.name(),
                source
            );
            Ok(())
        }
        FailedBatchPolicy::DeadLetter => {
            let Some(writer) = ctx.dead_letter.as_ref() else {
                return Err(PipelineError::BatchAbandoned {
                    records,
                    attempts: outcome.attempts,
                    source,
                });
            };
            writer
                .write_batch(batch, outcome.attempts, &source)
                .await
                .map_err(PipelineError::DeadLetter)?;
            error!(
                "Batch of {} records failed after {} attempt(s): {}; written to {}",
                records,
                outcome.attempts,
                source,
                writer.path().display()
            );
            Ok(())
        }
        FailedBatchPolicy::FailFast => {
            info!("Failed-batch policy is fail-fast, cancelling the import");
            Err(PipelineError::BatchAbandoned {
                records,
                attempts: outcome.attempts,
                source,
            })
        }
    }
}
