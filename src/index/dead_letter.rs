//! Dead-letter file for batches that exhausted their retries.
//!
//! Each abandoned document becomes one JSON line:
//! `{"failedAt": "...", "attempts": 3, "error": "...", "document": {...}}`.
//! Re-importing is a matter of extracting `.document` (e.g. with `jq -c .document`).

use std::path::{Path, PathBuf};

use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error_handling::SinkError;
use crate::models::Document;

/// Append-only JSON lines writer shared by all workers.
pub struct DeadLetterWriter {
    path: PathBuf,
    file: Mutex<tokio::fs::File>,
}

impl DeadLetterWriter {
    /// Opens `path` for appending, creating it if needed.
    pub async fn open(path: &Path) -> std::io::Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends every document of `batch`. Lines of one batch are never
    /// interleaved with another worker's.
    pub async fn write_batch(
        &self,
        batch: &[Document],
        attempts: usize,
        error: &SinkError,
    ) -> std::io::Result<()> {
        let failed_at = chrono::Utc::now().to_rfc3339();
        let error = error.to_string();

        let mut buf = Vec::with_capacity(batch.len() * 512);
        for document in batch {
            let line = json!({
                "failedAt": failed_at,
                "attempts": attempts,
                "error": error,
                "document": document,
            });
            serde_json::to_writer(&mut buf, &line)?;
            buf.push(b'\n');
        }

        let mut file = self.file.lock().await;
        file.write_all(&buf).await?;
        file.flush().await
    }
}
