//! Process resource monitoring
//!
//! Memory figures are reported in logs and response bodies only; nothing in the service
//! makes decisions based on them.

use jpg2avif_core::models::{bytes_to_mb, round_to, MemoryUsage};
use sysinfo::{Pid, System};

pub trait ResourceMonitor: Send + Sync {
    /// Current memory usage of this process.
    fn memory_usage(&self) -> MemoryUsage;

    /// Resident set size in MB.
    fn rss_mb(&self) -> f64 {
        self.memory_usage().rss_mb
    }
}

/// [`ResourceMonitor`] backed by `sysinfo`.
///
/// Every sample reads the process entry into its own [`System`], so concurrent requests
/// never contend on a shared handle.
#[derive(Clone, Copy, Debug)]
pub struct SysinfoResourceMonitor {
    pid: Option<Pid>,
    total_memory: u64,
}

impl SysinfoResourceMonitor {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!(error = %e, "Unable to determine current pid; memory will read as zero");
                None
            }
        };

        let mut system = System::new();
        system.refresh_memory();

        Self {
            pid,
            total_memory: system.total_memory(),
        }
    }
}

impl Default for SysinfoResourceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceMonitor for SysinfoResourceMonitor {
    fn memory_usage(&self) -> MemoryUsage {
        let Some(pid) = self.pid else {
            return MemoryUsage::default();
        };

        let mut system = System::new();
        if !system.refresh_process(pid) {
            return MemoryUsage::default();
        }

        match system.process(pid) {
            Some(process) => {
                let rss = process.memory();
                let percent = if self.total_memory == 0 {
                    0.0
                } else {
                    round_to(rss as f64 / self.total_memory as f64 * 100.0, 2)
                };
                MemoryUsage {
                    rss_mb: bytes_to_mb(rss as usize),
                    vms_mb: bytes_to_mb(process.virtual_memory() as usize),
                    percent,
                }
            }
            None => MemoryUsage::default(),
        }
    }
}
