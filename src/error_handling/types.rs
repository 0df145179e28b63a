//! Error type definitions.
//!
//! Typed errors for each stage of the pipeline. The orchestration layer wraps
//! these in `anyhow` with context; module boundaries return them directly.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use reqwest::StatusCode;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The index URL could not be parsed.
    #[error("Invalid index URL '{url}': {source}")]
    IndexUrlError {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Rejected configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("--failed-batches dead-letter requires --dead-letter-path")]
    MissingDeadLetterPath,
}

/// Failures of the line source.
///
/// Open-time variants (`SourceUnavailable`, `CredentialsMissing`,
/// `HeaderReadError`) stop the run before any batch is dispatched.
/// `RecordTooLarge` and `Read` occur mid-stream and stop the producer only.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Source unavailable: {location}: {reason}")]
    SourceUnavailable { location: String, reason: String },

    #[error("Remote source requires credentials: {0}")]
    CredentialsMissing(String),

    #[error("Failed to read header line: {0}")]
    HeaderReadError(String),

    #[error("Line {line_number} exceeds the {limit} byte limit")]
    RecordTooLarge { line_number: u64, limit: usize },

    #[error("Read error after line {line_number}: {source}")]
    Read {
        line_number: u64,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub(crate) fn unavailable(location: impl Into<String>, reason: impl ToString) -> Self {
        SourceError::SourceUnavailable {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failure of a single batch submission to the index.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Connection, timeout, or body transfer failure.
    #[error("Index request failed: {0}")]
    Transport(#[from] ReqwestError),

    /// The index answered with a non-success status.
    #[error("Index rejected batch with HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Documents could not be encoded.
    #[error("Failed to encode documents: {0}")]
    Encode(#[from] serde_json::Error),

    /// Any other sink-specific failure.
    #[error("{0}")]
    Other(String),
}

impl SinkError {
    /// Whether another attempt could succeed.
    ///
    /// Transport failures, 429 and 5xx are transient. Other 4xx answers and
    /// encoding failures will fail identically on every attempt. `Other` keeps
    /// the retry-everything behavior for sinks that do not classify.
    pub fn is_retriable(&self) -> bool {
        match self {
            SinkError::Transport(_) | SinkError::Other(_) => true,
            SinkError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            SinkError::Encode(_) => false,
        }
    }
}

/// Failures that end an import run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Malformed line {line_number}: expected at least {expected} fields, found {found}")]
    MalformedLine {
        line_number: u64,
        expected: usize,
        found: usize,
    },

    #[error("Batch of {records} records abandoned after {attempts} attempts: {source}")]
    BatchAbandoned {
        records: usize,
        attempts: usize,
        #[source]
        source: SinkError,
    },

    #[error("Distribution channel closed while {0} records were pending")]
    ChannelClosed(usize),

    #[error("Failed to write dead-letter file: {0}")]
    DeadLetter(#[source] std::io::Error),
}
