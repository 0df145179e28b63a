//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources of an
//! import run:
//! - Logger
//! - HTTP client
//! - Index sink
//! - Dead-letter writer
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

use std::sync::Arc;

use crate::config::{Config, FailedBatchPolicy};
use crate::error_handling::InitializationError;
use crate::index::{DeadLetterWriter, DocumentSink, MeilisearchSink};

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;

/// Initializes the Meilisearch sink selected by the configuration.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the client cannot be
/// built and `InitializationError::IndexUrlError` if `--meili-host` is not
/// an absolute URL.
pub fn init_index_sink(config: &Config) -> Result<Arc<dyn DocumentSink>, InitializationError> {
    let client = init_client(config)?;
    let sink = MeilisearchSink::new(
        client,
        &config.meili_host,
        &config.index_name,
        &config.meili_api_key,
    )?;
    log::debug!("Index documents endpoint: {}", sink.documents_url());
    Ok(Arc::new(sink))
}

/// Opens the dead-letter file when the failed-batch policy needs one.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be created or opened for appending.
pub async fn init_dead_letter(
    config: &Config,
) -> Result<Option<Arc<DeadLetterWriter>>, std::io::Error> {
    match (config.failed_batches, config.dead_letter_path.as_deref()) {
        (FailedBatchPolicy::DeadLetter, Some(path)) => {
            let writer = DeadLetterWriter::open(path).await?;
            log::info!("Abandoned batches will be written to {}", path.display());
            Ok(Some(Arc::new(writer)))
        }
        _ => Ok(None),
    }
}
