//! Local host metrics collected alongside device probes.

use std::env::consts;

use serde::{Deserialize, Serialize};
use sysinfo::{System, SystemExt};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub hostname: String,
    pub platform: String,
    pub arch: String,
    /// Seconds since boot
    pub uptime: u64,
    /// 1, 5 and 15 minute load averages
    pub loadavg: [f64; 3],
    pub memory: MemoryInfo,
    pub cpus: usize,
}

/// Memory figures in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub free: u64,
    pub used: u64,
}

/// System section of a snapshot; a collection failure only degrades this field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemReport {
    Available(SystemInfo),
    Unavailable { error: String },
}

/// Collect host metrics. Blocking; see [`collect_system_info`].
pub fn collect() -> SystemInfo {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu();

    let load = sys.load_average();
    let total = sys.total_memory();
    let free = sys.free_memory();

    SystemInfo {
        hostname: sys.host_name().unwrap_or_else(|| "unknown".to_string()),
        platform: consts::OS.to_string(),
        arch: consts::ARCH.to_string(),
        uptime: sys.uptime(),
        loadavg: [load.one, load.five, load.fifteen],
        memory: MemoryInfo { total, free, used: total.saturating_sub(free) },
        cpus: sys.cpus().len(),
    }
}

pub async fn collect_system_info() -> SystemReport {
    match tokio::task::spawn_blocking(collect).await {
        Ok(info) => SystemReport::Available(info),
        Err(e) => {
            warn!(error = %e, "System info collection failed");
            SystemReport::Unavailable { error: e.to_string() }
        }
    }
}
