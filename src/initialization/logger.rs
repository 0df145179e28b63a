//! Logger setup for the importer binary.

use std::io::Write;

use colored::*;
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};
use serde_json::json;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependency crates capped below the importer's own level.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    ("rustls", LevelFilter::Warn),
];

/// Installs the global logger.
///
/// `RUST_LOG` is read first, so per-module directives such as
/// `RUST_LOG=reqwest=debug` still apply; `level` then sets the importer's
/// own verbosity.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, cap) in QUIET_MODULES {
        builder.filter_module(module, (*cap).min(level));
    }
    builder.filter_module("terminology_importer", level);

    match format {
        LogFormat::Json => {
            builder.format(write_json_line);
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(write_plain_line);
        }
    }

    builder.try_init().map_err(InitializationError::from)
}

/// One JSON object per record, for log shippers.
fn json_line(record: &Record) -> serde_json::Value {
    json!({
        "ts": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
}

fn write_json_line(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    writeln!(buf, "{}", json_line(record))
}

fn write_plain_line(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    let level = record.level().as_str();
    let level = match record.level() {
        Level::Error => level.red(),
        Level::Warn => level.yellow(),
        Level::Info => level.green(),
        Level::Debug => level.blue(),
        Level::Trace => level.purple(),
    };
    writeln!(
        buf,
        "{} {} [{}] {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.target().cyan(),
        level,
        record.args()
    )
}
