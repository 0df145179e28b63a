//! Index sinks.
//!
//! The pipeline depends on one index capability only: accept an ordered batch
//! of documents and report success or failure ([`DocumentSink`]). The crate
//! ships a Meilisearch implementation; tests and embedders can supply their own.

mod dead_letter;
mod meilisearch;

use async_trait::async_trait;

use crate::error_handling::SinkError;
use crate::models::Document;

pub use dead_letter::DeadLetterWriter;
pub use meilisearch::MeilisearchSink;

/// Destination of document batches.
///
/// Shared by every worker behind an `Arc`, so implementations must be
/// callable concurrently.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Submits one batch. Called again with the same batch on retry.
    async fn add_documents(&self, documents: &[Document]) -> Result<(), SinkError>;

    /// Name used in log lines.
    fn name(&self) -> String;
}
