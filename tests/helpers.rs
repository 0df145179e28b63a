// Shared test helpers: in-memory sinks and fixture files.
//
// Each integration test file includes this module with `mod helpers;`, so not
// every helper is used by every file.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use terminology_importer::{Config, Document, DocumentSink, SinkError};

/// Header line of a SNOMED CT RF2 description file.
pub const SNOMED_HEADER: &str =
    "id\teffectiveTime\tactive\tmoduleId\tconceptId\tlanguageCode\ttypeId\tterm\tcaseSignificanceId";

/// A valid description line whose `id` column is `n`.
pub fn snomed_line(n: usize) -> String {
    format!(
        "{n}\t20240515\t1\t11000274103\t{}\tde\t900000000000013009\tBegriff {n}\t900000000000448009",
        100_000 + n
    )
}

/// Writes a header plus `records` valid lines to `dir/name`.
pub fn write_snomed_file(dir: &Path, name: &str, records: usize) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create fixture");
    writeln!(file, "{SNOMED_HEADER}").expect("Failed to write header");
    for n in 0..records {
        writeln!(file, "{}", snomed_line(n)).expect("Failed to write line");
    }
    path
}

/// Writes raw content to `dir/name`.
pub fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}

/// Configuration reading `path` locally, with no pause between batches.
pub fn local_config(path: &Path, batch_size: usize, workers: usize) -> Config {
    Config {
        file: path.to_string_lossy().into_owned(),
        batch_size,
        workers,
        retry_delay_ms: 1,
        batch_interval_ms: 0,
        ..Default::default()
    }
}

/// Sink that accepts everything and remembers each batch's document ids.
#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<Vec<String>>>,
    delay: Duration,
}

impl RecordingSink {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().expect("lock poisoned").clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.batches().into_iter().flatten().collect()
    }
}

#[async_trait]
impl DocumentSink for RecordingSink {
    async fn add_documents(&self, documents: &[Document]) -> Result<(), SinkError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.batches
            .lock()
            .expect("lock poisoned")
            .push(documents.iter().map(|d| d.id.clone()).collect());
        Ok(())
    }

    fn name(&self) -> String {
        "recording sink".into()
    }
}

/// Sink that rejects every submission with a retriable error.
#[derive(Default)]
pub struct FailingSink {
    calls: AtomicUsize,
}

impl FailingSink {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSink for FailingSink {
    async fn add_documents(&self, _documents: &[Document]) -> Result<(), SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Other("index unreachable".into()))
    }

    fn name(&self) -> String {
        "failing sink".into()
    }
}
