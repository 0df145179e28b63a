//! Run-level utilities: progress accounting, memory probing, interrupt
//! handling, and the final summary.

pub mod memory;
pub mod progress;
pub mod shutdown;
pub mod statistics;

pub use memory::MemoryProbe;
pub use progress::{crossed_interval, log_progress, ProgressCounters, ProgressSnapshot};
pub use shutdown::{shutdown_gracefully, spawn_interrupt_listener};
pub use statistics::log_completion;
