//! Record parsing.
//!
//! Splits delimited export lines into positional fields and maps them onto a
//! [`Document`](crate::models::Document) using a static column layout:
//! - SNOMED CT description files (9 columns)
//! - ICD-10-GM code files (28 columns)
//!
//! Lines with fewer fields than the layout requires are reported as skipped,
//! never as errors; the caller decides what a skip means.

mod layout;
mod record;

// Re-export public API
pub use layout::{RecordLayout, ICD_10_GM_CODE, SNOMED_CT_DESCRIPTION};
pub use record::{parse_line, Parsed, RecordParser};
