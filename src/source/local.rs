//! Local file backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::BufReader;

use crate::config::INITIAL_LINE_BUFFER_BYTES;
use crate::error_handling::SourceError;

use super::lines::BoundedLineReader;
use super::LineSource;

/// Reads lines from a file on the local filesystem.
pub struct LocalFileSource {
    path: PathBuf,
    reader: BoundedLineReader,
}

impl LocalFileSource {
    /// Opens `path` for sequential reading.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::SourceUnavailable` if the file cannot be opened.
    pub async fn open(path: &Path, max_line_bytes: usize) -> Result<Self, SourceError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| SourceError::unavailable(path.display().to_string(), e))?;
        log::debug!("Opened local file {}", path.display());

        let reader = BufReader::with_capacity(INITIAL_LINE_BUFFER_BYTES, file);
        Ok(Self {
            path: path.to_path_buf(),
            reader: BoundedLineReader::new(Box::new(reader), max_line_bytes),
        })
    }
}

#[async_trait]
impl LineSource for LocalFileSource {
    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        self.reader.next_line().await
    }

    async fn close(&mut self) {
        if self.reader.close() {
            log::debug!("Closed local file {}", self.path.display());
        }
    }

    fn lines_read(&self) -> u64 {
        self.reader.line_number()
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
