//! Error handling.
//!
//! This module provides:
//! - Typed errors for initialization, configuration, the line source, the
//!   index sink, and the pipeline as a whole
//! - The retry strategy for batch submissions
//!
//! Errors are split by consequence:
//! - **Fatal**: source open failures, configuration errors, fail-fast policies
//! - **Recovered**: malformed lines (skipped), exhausted batches (dropped or
//!   dead-lettered), memory probe failures (figure omitted)

mod categorization;
mod types;

// Re-export public API
pub use categorization::get_retry_strategy;
pub use types::{ConfigError, InitializationError, PipelineError, SinkError, SourceError};
