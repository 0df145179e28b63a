//! Configuration constants.
//!
//! Defaults for every tunable of the import pipeline. The CLI exposes each of
//! these as an overridable option.

/// Records per batch handed to a worker.
pub const DEFAULT_BATCH_SIZE: usize = 5000;
/// Concurrent index submission workers.
pub const DEFAULT_WORKERS: usize = 5;

// Retry strategy
/// Total submission attempts per batch (initial attempt included).
pub const DEFAULT_MAX_RETRIES: usize = 3;
/// Fixed delay between two submission attempts of the same batch.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 300;

/// Emit a progress line each time the indexed-records total crosses a multiple of this.
pub const DEFAULT_LOG_INTERVAL: u64 = 10_000;
/// Pause a worker takes after each batch before pulling the next one.
pub const DEFAULT_BATCH_INTERVAL_MS: u64 = 1;

// Line source limits
/// Initial capacity of the line buffer.
pub const INITIAL_LINE_BUFFER_BYTES: usize = 64 * 1024;
/// Hard ceiling for a single record line (16MB).
/// The longest SNOMED CT description lines are a few KB; anything near this
/// ceiling is a corrupt or mis-delimited file.
pub const DEFAULT_MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

// Index
pub const DEFAULT_MEILI_HOST: &str = "http://localhost:7700";
pub const DEFAULT_MEILI_API_KEY: &str = "master-key";
pub const DEFAULT_INDEX_NAME: &str = "terminologies";
/// Per-request timeout for index submissions, and the connect and per-read
/// timeout of object downloads.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

// Remote object storage
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";

// Record layout
pub const SNOMED_CT_CONTEXT: &str = "snomed-ct";
pub const ICD_10_GM_CONTEXT: &str = "icd-10-gm";
pub const DEFAULT_DELIMITER: char = '\t';
pub const DEFAULT_INPUT_FILE: &str = "sct2_Description_Full_GermanyEdition_20240515.txt";

pub const BYTES_PER_MB: u64 = 1024 * 1024;
