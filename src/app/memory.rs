//! Process memory probe.

use std::sync::Mutex;

use sysinfo::{Pid, System};

use crate::config::BYTES_PER_MB;

/// Reads the resident set size of the current process.
///
/// Failures are reported as `None`; callers omit the figure rather than fail.
pub struct MemoryProbe {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                log::debug!("Memory probe disabled: {}", e);
                None
            }
        };
        Self {
            system: Mutex::new(System::new()),
            pid,
        }
    }

    pub fn rss_bytes(&self) -> Option<u64> {
        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        if !system.refresh_process(pid) {
            log::debug!("Process {} not found while probing memory", pid);
            return None;
        }
        system.process(pid).map(|process| process.memory())
    }

    pub fn rss_mb(&self) -> Option<u64> {
        self.rss_bytes().map(|bytes| bytes / BYTES_PER_MB)
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}
