use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::network::NetworkHostResult;
use crate::probe::ProbeResult;
use crate::registry::LinkState;
use crate::system::SystemReport;

/// Overall health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Healthy,
    Degraded,
    Critical,
    /// The verdict itself could not be computed
    Error,
}

impl Verdict {
    /// The one place a verdict is derived from device results.
    ///
    /// | database | printers | verdict  |
    /// |----------|----------|----------|
    /// | ok       | ok       | HEALTHY  |
    /// | ok       | down     | DEGRADED |
    /// | down     | ok       | DEGRADED |
    /// | down     | down     | CRITICAL |
    pub fn derive(database_ok: bool, all_printers_ok: bool) -> Self {
        match (database_ok, all_printers_ok) {
            (true, true) => Verdict::Healthy,
            (true, false) | (false, true) => Verdict::Degraded,
            (false, false) => Verdict::Critical,
        }
    }

    /// Whether orchestration probes should treat the system as serving
    pub fn is_serving(self) -> bool {
        matches!(self, Verdict::Healthy | Verdict::Degraded)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Healthy => write!(f, "HEALTHY"),
            Verdict::Degraded => write!(f, "DEGRADED"),
            Verdict::Critical => write!(f, "CRITICAL"),
            Verdict::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of probing one printer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterStatus {
    pub device_id: String,
    pub display_name: String,
    pub host: String,
    pub connection: ProbeResult,
    /// Registry link state once the connection probe has settled
    pub link_state: LinkState,
    /// Best-effort; never downgrades `connection`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_status: Option<ProbeResult>,
}

/// Immutable result of one full diagnostic pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSnapshot {
    /// Assigned once, after every probe has joined
    pub timestamp: DateTime<Utc>,
    pub network: BTreeMap<String, NetworkHostResult>,
    pub database: BTreeMap<String, ProbeResult>,
    pub printers: BTreeMap<String, PrinterStatus>,
    pub system: SystemReport,
}

impl DiagnosticSnapshot {
    /// The database target answered. False when no database is configured.
    pub fn database_ok(&self) -> bool {
        !self.database.is_empty() && self.database.values().all(ProbeResult::is_success)
    }

    /// Every printer connection succeeded; vacuously true without printers
    pub fn all_printers_ok(&self) -> bool {
        self.printers.values().all(|p| p.connection.is_success())
    }

    /// Every host is alive; informational only
    pub fn network_ok(&self) -> bool {
        self.network.values().all(|n| n.alive)
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::derive(self.database_ok(), self.all_printers_ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    Warning,
    Error,
}

/// Severity-tagged hint derived from a failing check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub component: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub overall_status: Verdict,
    pub total_checks: usize,
    pub passed_checks: usize,
    pub failed_checks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated: DateTime<Utc>,
    pub summary: ReportSummary,
    pub details: DiagnosticSnapshot,
    pub recommendations: Vec<Recommendation>,
}
