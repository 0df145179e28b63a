//! Application configuration and constants.
//!
//! This module provides:
//! - Default values for every pipeline tunable
//! - CLI option types and parsing
//! - Policy enums for malformed lines and failed batches

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    Config, DocType, FailedBatchPolicy, LogFormat, LogLevel, MalformedLinePolicy, SourceKind,
};
