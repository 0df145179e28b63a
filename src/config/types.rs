//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration. Every option falls back to an environment variable where
//! the deployment historically provided one (`SOURCE_TYPE`, `MEILI_HOST`, ...).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use strum_macros::{Display, EnumIter};

use crate::config::constants::*;
use crate::error_handling::ConfigError;
use crate::source::{RemoteObject, SourceConfig};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Where the export file is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SourceKind {
    /// A file on the local filesystem
    Local,
    /// An object in a cloud storage bucket
    #[value(alias = "bucket")]
    Remote,
}

/// Terminology export format, which fixes the positional column layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Display, EnumIter)]
pub enum DocType {
    /// SNOMED CT RF2 description file (9 columns)
    #[value(name = "snomed-ct-description")]
    #[strum(serialize = "snomed-ct-description")]
    SnomedCtDescription,
    /// ICD-10-GM code file (28 columns)
    #[value(name = "icd-10-gm-code")]
    #[strum(serialize = "icd-10-gm-code")]
    Icd10GmCode,
}

impl DocType {
    /// Terminology tag stored on documents of this type.
    pub fn default_context(self) -> &'static str {
        match self {
            DocType::SnomedCtDescription => SNOMED_CT_CONTEXT,
            DocType::Icd10GmCode => ICD_10_GM_CONTEXT,
        }
    }
}

/// What to do with a line that has fewer fields than the layout requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum MalformedLinePolicy {
    /// Drop the line silently (only the skip counter moves)
    Skip,
    /// Stop reading and fail the run
    FailFast,
}

/// What to do with a batch once every submission attempt has failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FailedBatchPolicy {
    /// Log the loss and continue with the next batch
    Drop,
    /// Append the batch to the dead-letter file and continue
    DeadLetter,
    /// Stop the run once in-flight batches have finished
    FailFast,
}

fn parse_delimiter(raw: &str) -> Result<char, String> {
    match raw {
        "\\t" | "tab" => Ok('\t'),
        "comma" => Ok(','),
        "pipe" => Ok('|'),
        "semicolon" => Ok(';'),
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!(
                    "delimiter must be a single character or one of tab|comma|pipe|semicolon, got '{raw}'"
                )),
            }
        }
    }
}

/// Import configuration.
///
/// Parsed from the command line by `clap`, or built programmatically for
/// library use.
///
/// # Examples
///
/// ```no_run
/// use terminology_importer::Config;
///
/// let config = Config {
///     file: "sct2_Description_Full.txt".to_string(),
///     batch_size: 1000,
///     workers: 8,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
///
/// ```bash
/// # Local file, default layout
/// terminology_importer sct2_Description_Full_GermanyEdition_20240515.txt
///
/// # ICD-10-GM from a bucket, semicolon separated, no header row
/// terminology_importer icd10gm2024.txt --source-type remote --bucket terms \
///     --doc-type icd-10-gm-code --context icd-10-gm --delimiter ';' --no-header
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "terminology_importer",
    about = "Streams a terminology export into a Meilisearch index.",
    version
)]
pub struct Config {
    /// File to import: a local path, or the object name inside the bucket
    #[arg(default_value = DEFAULT_INPUT_FILE)]
    pub file: String,

    /// Where to read the file from: local|remote
    #[arg(long, env = "SOURCE_TYPE", value_enum, default_value_t = SourceKind::Local)]
    pub source_type: SourceKind,

    /// Bucket holding the export (remote source only)
    #[arg(long, env = "BUCKET_NAME_PRIVATE")]
    pub bucket: Option<String>,

    /// Directory prefix prepended to the object name (remote source only)
    #[arg(long, env = "FILE_KEY_BASE_DIR")]
    pub key_prefix: Option<String>,

    /// OAuth bearer token for the storage API (remote source only)
    #[arg(long, env = "GCS_ACCESS_TOKEN", hide_env_values = true)]
    pub storage_token: Option<String>,

    /// Storage JSON API endpoint
    #[arg(long, env = "STORAGE_ENDPOINT", default_value = DEFAULT_STORAGE_ENDPOINT)]
    pub storage_endpoint: String,

    /// Meilisearch base URL
    #[arg(long, env = "MEILI_HOST", default_value = DEFAULT_MEILI_HOST)]
    pub meili_host: String,

    /// Meilisearch API key
    #[arg(long, env = "MEILI_API_KEY", default_value = DEFAULT_MEILI_API_KEY, hide_env_values = true)]
    pub meili_api_key: String,

    /// Target index uid
    #[arg(long, default_value = DEFAULT_INDEX_NAME)]
    pub index_name: String,

    /// Column layout of the export
    #[arg(long, value_enum, default_value_t = DocType::SnomedCtDescription)]
    pub doc_type: DocType,

    /// Provenance tag stored on every document (defaults to the doc type's terminology)
    #[arg(long)]
    pub context: Option<String>,

    /// Prefix of generated document ids (defaults to the doc type name)
    #[arg(long)]
    pub id_prefix: Option<String>,

    /// Field delimiter: a single character, or tab|comma|pipe|semicolon
    #[arg(long, value_parser = parse_delimiter, default_value = "tab")]
    pub delimiter: char,

    /// The file has no header row
    #[arg(long)]
    pub no_header: bool,

    /// Records per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Concurrent index submission workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Submission attempts per batch (initial attempt included)
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: usize,

    /// Delay between submission attempts in milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,

    /// Log progress every N indexed records
    #[arg(long, default_value_t = DEFAULT_LOG_INTERVAL)]
    pub log_interval: u64,

    /// Pause after each batch in milliseconds
    #[arg(long, default_value_t = DEFAULT_BATCH_INTERVAL_MS)]
    pub batch_interval_ms: u64,

    /// Longest accepted input line in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_BYTES)]
    pub max_line_bytes: usize,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Malformed line handling: skip|fail-fast
    #[arg(long, value_enum, default_value_t = MalformedLinePolicy::Skip)]
    pub malformed_lines: MalformedLinePolicy,

    /// Handling of batches that exhausted their retries: drop|dead-letter|fail-fast
    #[arg(long, value_enum, default_value_t = FailedBatchPolicy::Drop)]
    pub failed_batches: FailedBatchPolicy,

    /// JSON lines file receiving abandoned batches (dead-letter policy)
    #[arg(long)]
    pub dead_letter_path: Option<PathBuf>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: DEFAULT_INPUT_FILE.to_string(),
            source_type: SourceKind::Local,
            bucket: None,
            key_prefix: None,
            storage_token: None,
            storage_endpoint: DEFAULT_STORAGE_ENDPOINT.to_string(),
            meili_host: DEFAULT_MEILI_HOST.to_string(),
            meili_api_key: DEFAULT_MEILI_API_KEY.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            doc_type: DocType::SnomedCtDescription,
            context: None,
            id_prefix: None,
            delimiter: DEFAULT_DELIMITER,
            no_header: false,
            batch_size: DEFAULT_BATCH_SIZE,
            workers: DEFAULT_WORKERS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            log_interval: DEFAULT_LOG_INTERVAL,
            batch_interval_ms: DEFAULT_BATCH_INTERVAL_MS,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            malformed_lines: MalformedLinePolicy::Skip,
            failed_batches: FailedBatchPolicy::Drop,
            dead_letter_path: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Rejects settings the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for zero sizes or counts, and
    /// `ConfigError::MissingDeadLetterPath` when the dead-letter policy is
    /// selected without a destination file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "workers",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_retries",
                reason: "at least one submission attempt is required".into(),
            });
        }
        if self.max_line_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_line_bytes",
                reason: "must be at least 1".into(),
            });
        }
        if self.failed_batches == FailedBatchPolicy::DeadLetter && self.dead_letter_path.is_none()
        {
            return Err(ConfigError::MissingDeadLetterPath);
        }
        Ok(())
    }

    pub fn has_header(&self) -> bool {
        !self.no_header
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Provenance tag, the doc type's terminology unless overridden.
    pub fn context(&self) -> String {
        self.context
            .clone()
            .unwrap_or_else(|| self.doc_type.default_context().to_string())
    }

    /// Document id prefix, `<doc-type>` unless overridden.
    pub fn id_prefix(&self) -> String {
        self.id_prefix
            .clone()
            .unwrap_or_else(|| self.doc_type.to_string())
    }

    /// Builds the source description selected by `source_type`.
    pub fn source_config(&self) -> SourceConfig {
        match self.source_type {
            SourceKind::Local => SourceConfig::Local {
                path: PathBuf::from(&self.file),
                max_line_bytes: self.max_line_bytes,
            },
            SourceKind::Remote => {
                let key = match self.key_prefix.as_deref() {
                    Some(prefix) if !prefix.is_empty() => {
                        format!("{}/{}", prefix.trim_end_matches('/'), self.file)
                    }
                    _ => self.file.clone(),
                };
                SourceConfig::Remote {
                    object: RemoteObject {
                        endpoint: self.storage_endpoint.clone(),
                        bucket: self.bucket.clone().unwrap_or_default(),
                        key,
                    },
                    token: self.storage_token.clone(),
                    timeout: self.request_timeout(),
                    max_line_bytes: self.max_line_bytes,
                }
            }
        }
    }
}
