//! terminology_importer library: streams terminology exports into a search index
//!
//! This library reads a line-oriented terminology export (SNOMED CT
//! descriptions, ICD-10-GM codes) from a local file or a storage bucket,
//! turns each line into a [`Document`], groups documents into batches, and
//! submits the batches to a Meilisearch index from a pool of workers with
//! bounded retries.
//!
//! # Example
//!
//! ```no_run
//! use terminology_importer::{run_import, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file: "sct2_Description_Full_GermanyEdition_20240515.txt".into(),
//!     batch_size: 5000,
//!     workers: 5,
//!     ..Default::default()
//! };
//!
//! let report = run_import(config).await?;
//! println!("Indexed {} records in {} batches",
//!          report.records_indexed, report.batches_indexed);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
mod batch;
pub mod config;
mod error_handling;
pub mod index;
pub mod initialization;
pub mod models;
pub mod parse;
pub mod source;
mod worker;

// Re-export public API
pub use app::{MemoryProbe, ProgressCounters, ProgressSnapshot};
pub use config::{
    Config, DocType, FailedBatchPolicy, LogFormat, LogLevel, MalformedLinePolicy, SourceKind,
};
pub use error_handling::{ConfigError, InitializationError, PipelineError, SinkError, SourceError};
pub use index::DocumentSink;
pub use models::{Batch, Document};
pub use run::{run_import, run_pipeline, ImportContext, ImportReport};

// Internal run module (producer loop and orchestration)
mod run {
    use anyhow::{Context, Result};
    use std::sync::Arc;
    use std::time::Instant;

    use log::{error, info, warn};
    use tokio_util::sync::CancellationToken;

    use crate::app::{
        log_completion, shutdown_gracefully, spawn_interrupt_listener, MemoryProbe,
        ProgressCounters,
    };
    use crate::batch::Batcher;
    use crate::config::{Config, MalformedLinePolicy};
    use crate::error_handling::PipelineError;
    use crate::index::{DeadLetterWriter, DocumentSink};
    use crate::initialization::{init_dead_letter, init_index_sink};
    use crate::parse::{Parsed, RecordLayout, RecordParser};
    use crate::source::{open_source, LineSource};
    use crate::worker::{spawn_workers, RetryPolicy, WorkerContext, WorkerSettings};

    /// Results of an import run.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ImportReport {
        /// Records accepted by the index
        pub records_indexed: u64,
        /// Batches accepted by the index
        pub batches_indexed: u64,
        /// Batches given up on after exhausting their attempts
        pub batches_abandoned: u64,
        /// Records contained in abandoned batches
        pub records_abandoned: u64,
        /// Data lines consumed from the source, header excluded
        pub lines_read: u64,
        /// Lines skipped for having too few fields
        pub lines_skipped: u64,
        /// Submission attempts across all batches
        pub submission_attempts: u64,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
        /// Whether the run stopped early on an interrupt
        pub cancelled: bool,
    }

    /// Collaborators of a run that callers may supply themselves.
    pub struct ImportContext {
        pub sink: Arc<dyn DocumentSink>,
        /// Counters owned by this run; read them while the run is in flight
        /// for live progress.
        pub counters: Arc<ProgressCounters>,
        /// Cancelling stops reading; batches already read are still indexed.
        pub cancel: CancellationToken,
        pub dead_letter: Option<Arc<DeadLetterWriter>>,
    }

    impl ImportContext {
        pub fn new(sink: Arc<dyn DocumentSink>) -> Self {
            Self {
                sink,
                counters: Arc::new(ProgressCounters::new()),
                cancel: CancellationToken::new(),
                dead_letter: None,
            }
        }
    }

    /// Runs an import with the provided configuration.
    ///
    /// This is the main entry point for the library. It opens the configured
    /// source, creates the Meilisearch sink, and stops reading on Ctrl-C.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The configuration is invalid
    /// - The index sink or dead-letter file cannot be initialized
    /// - The source cannot be opened or fails mid-stream
    /// - A fail-fast policy triggers
    pub async fn run_import(config: Config) -> Result<ImportReport> {
        config.validate().context("Invalid configuration")?;

        let sink = init_index_sink(&config).context("Failed to initialize index sink")?;
        let dead_letter = init_dead_letter(&config)
            .await
            .context("Failed to open dead-letter file")?;

        let source = open_source(&config.source_config(), config.has_header())
            .await
            .context("Failed to open input")?;

        let mut ctx = ImportContext::new(sink);
        ctx.dead_letter = dead_letter;

        let done = CancellationToken::new();
        let listener = spawn_interrupt_listener(ctx.cancel.clone(), done.clone());

        let result = run_pipeline(&config, source, ctx).await;

        shutdown_gracefully(done, vec![listener]).await;
        result
    }

    /// Streams every line of `source` through parsing, batching and the worker
    /// pool, then waits for all workers.
    ///
    /// The source is always closed before returning. Batches already handed to
    /// a worker are finished even when the run fails or is cancelled.
    ///
    /// # Errors
    ///
    /// Returns the first worker error (fail-fast batch, dead-letter write
    /// failure) if any, otherwise the producer's error (read failure,
    /// fail-fast malformed line).
    pub async fn run_pipeline(
        config: &Config,
        mut source: Box<dyn LineSource>,
        ctx: ImportContext,
    ) -> Result<ImportReport> {
        let start_time = Instant::now();
        let memory = Arc::new(MemoryProbe::new());
        let parser = RecordParser::new(
            RecordLayout::for_doc_type(config.doc_type),
            config.delimiter,
            config.context(),
            config.id_prefix(),
        );

        info!(
            "Importing {} from {} into {} ({} workers, batches of {})",
            config.doc_type,
            source.location(),
            ctx.sink.name(),
            config.workers,
            config.batch_size
        );

        let (tx, rx) = flume::bounded(0);
        let worker_ctx = Arc::new(WorkerContext {
            sink: Arc::clone(&ctx.sink),
            counters: Arc::clone(&ctx.counters),
            memory: Arc::clone(&memory),
            dead_letter: ctx.dead_letter.clone(),
            settings: WorkerSettings {
                retry: RetryPolicy {
                    max_attempts: config.max_retries,
                    delay: config.retry_delay(),
                },
                batch_interval: config.batch_interval(),
                log_interval: config.log_interval,
                failed_batches: config.failed_batches,
            },
            cancel: ctx.cancel.clone(),
            start_time,
        });
        let workers = spawn_workers(config.workers.max(1), rx, worker_ctx);

        let mut batcher = Batcher::new(config.batch_size, tx, Arc::clone(&ctx.counters));
        let produced = produce(
            source.as_mut(),
            &parser,
            &mut batcher,
            config.malformed_lines,
            &ctx,
        )
        .await;

        // Records already read are still indexed, unless no worker is left.
        log::debug!("Producer finished with {} records pending", batcher.pending());
        let produced = match produced {
            Err(e @ PipelineError::ChannelClosed(_)) => Err(e),
            other => match batcher.flush().await {
                Ok(()) => other,
                Err(flush_error) => other.and(Err(flush_error)),
            },
        };
        source.close().await;
        drop(batcher);

        let mut worker_error = None;
        for handle in workers {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    worker_error.get_or_insert(e);
                }
                Err(e) => {
                    error!("Worker task failed: {}", e);
                }
            }
        }

        let cancelled = produced.as_ref().is_ok_and(|&cancelled| cancelled);
        let snapshot = ctx.counters.snapshot();
        let elapsed = start_time.elapsed();
        log_completion(&snapshot, elapsed, cancelled, &memory);

        if let Some(e) = worker_error {
            if let Err(producer_error) = &produced {
                warn!("Producer also stopped: {}", producer_error);
            }
            return Err(e).context("Import aborted by a worker");
        }
        produced.context("Import stopped while reading input")?;

        Ok(ImportReport {
            records_indexed: snapshot.records_indexed,
            batches_indexed: snapshot.batches_indexed,
            batches_abandoned: snapshot.batches_abandoned,
            records_abandoned: snapshot.records_abandoned,
            lines_read: snapshot.lines_read,
            lines_skipped: snapshot.lines_skipped,
            submission_attempts: snapshot.submission_attempts,
            elapsed_seconds: elapsed.as_secs_f64(),
            cancelled,
        })
    }

    /// Reads lines until the source is exhausted or the run is cancelled.
    ///
    /// Returns whether reading stopped because of cancellation.
    async fn produce(
        source: &mut dyn LineSource,
        parser: &RecordParser,
        batcher: &mut Batcher,
        malformed_lines: MalformedLinePolicy,
        ctx: &ImportContext,
    ) -> Result<bool, PipelineError> {
        loop {
            let next = tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => None,
                next = source.next_line() => Some(next?),
            };
            let Some(next) = next else {
                info!(
                    "Stopped reading {} after {} lines",
                    source.location(),
                    source.lines_read()
                );
                return Ok(true);
            };
            let Some(line) = next else {
                return Ok(false);
            };
            ctx.counters.record_line();

            match parser.parse(&line) {
                Parsed::Record(document) => batcher.accept(document).await?,
                Parsed::Skip { fields } => match malformed_lines {
                    MalformedLinePolicy::Skip => ctx.counters.record_skipped_line(),
                    MalformedLinePolicy::FailFast => {
                        return Err(PipelineError::MalformedLine {
                            line_number: source.lines_read(),
                            expected: parser.layout().min_fields(),
                            found: fields,
                        });
                    }
                },
            }
        }
    }
}
