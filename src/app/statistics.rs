//! End-of-run summary logging.

use log::{log, Level};
use std::time::Duration;

use super::memory::MemoryProbe;
use super::progress::ProgressSnapshot;

/// Logs the final figures of a run.
pub fn log_completion(
    snapshot: &ProgressSnapshot,
    elapsed: Duration,
    cancelled: bool,
    memory: &MemoryProbe,
) {
    for (level, line) in completion_lines(snapshot, elapsed, cancelled, memory.rss_mb()) {
        log!(level, "{}", line);
    }
}

/// Summary lines with their levels. Skipped lines are reported at debug only.
fn completion_lines(
    snapshot: &ProgressSnapshot,
    elapsed: Duration,
    cancelled: bool,
    rss_mb: Option<u64>,
) -> Vec<(Level, String)> {
    let elapsed_secs = elapsed.as_secs_f64();
    let mut lines = Vec::new();
    if cancelled {
        lines.push((
            Level::Warn,
            format!(
                "Import interrupted after {:.2} seconds; {} records were indexed before stopping",
                elapsed_secs, snapshot.records_indexed
            ),
        ));
    } else {
        lines.push((
            Level::Info,
            format!("Import completed in {:.2} seconds", elapsed_secs),
        ));
    }

    lines.push((
        Level::Info,
        format!(
            "Indexed {} record{} in {} batch{} ({} submission attempt{})",
            snapshot.records_indexed,
            plural(snapshot.records_indexed),
            snapshot.batches_indexed,
            if snapshot.batches_indexed == 1 { "" } else { "es" },
            snapshot.submission_attempts,
            plural(snapshot.submission_attempts),
        ),
    ));

    if snapshot.lines_skipped > 0 {
        lines.push((
            Level::Debug,
            format!(
                "Skipped {} of {} line{} with too few fields",
                snapshot.lines_skipped,
                snapshot.lines_read,
                plural(snapshot.lines_read)
            ),
        ));
    }

    if snapshot.batches_abandoned > 0 {
        lines.push((
            Level::Warn,
            format!(
                "Abandoned {} batch{} ({} records) after exhausting retries",
                snapshot.batches_abandoned,
                if snapshot.batches_abandoned == 1 { "" } else { "es" },
                snapshot.records_abandoned
            ),
        ));
    }

    if let Some(mb) = rss_mb {
        lines.push((
            Level::Info,
            format!("Final memory usage by this process: {} MB", mb),
        ));
    }
    lines
}

fn plural(count: u64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
