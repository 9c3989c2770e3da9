//! Health verdicts for operators and orchestration probes.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::aggregator::StatusAggregator;
use super::report::ReportGenerator;
use super::types::{DiagnosticSnapshot, Report, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthChecks {
    pub database: bool,
    pub printers: bool,
    pub network: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HealthDetail {
    Checked { checks: HealthChecks },
    Failed { error: String },
}

/// `{status, timestamp, uptimeSeconds, version, checks | error}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthVerdict {
    pub status: Verdict,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub version: String,
    #[serde(flatten)]
    pub detail: HealthDetail,
}

impl HealthVerdict {
    pub fn from_snapshot(snapshot: &DiagnosticSnapshot, uptime_seconds: u64) -> Self {
        Self {
            status: snapshot.verdict(),
            timestamp: Utc::now(),
            uptime_seconds,
            version: env!("CARGO_PKG_VERSION").to_string(),
            detail: HealthDetail::Checked {
                checks: HealthChecks {
                    database: snapshot.database_ok(),
                    printers: snapshot.all_printers_ok(),
                    network: snapshot.network_ok(),
                },
            },
        }
    }

    pub fn failed(error: impl Into<String>, uptime_seconds: u64) -> Self {
        Self {
            status: Verdict::Error,
            timestamp: Utc::now(),
            uptime_seconds,
            version: env!("CARGO_PKG_VERSION").to_string(),
            detail: HealthDetail::Failed { error: error.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Verdict>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Liveness {
    pub alive: bool,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
}

/// Health endpoints backed by the status aggregator
#[derive(Clone)]
pub struct HealthService {
    aggregator: Arc<StatusAggregator>,
    reports: ReportGenerator,
    started: Instant,
}

impl HealthService {
    pub fn new(aggregator: Arc<StatusAggregator>) -> Self {
        Self { reports: ReportGenerator::new(Arc::clone(&aggregator)), aggregator, started: Instant::now() }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Run a full pass and classify it. A pass that dies yields `ERROR`.
    pub async fn status(&self) -> HealthVerdict {
        let aggregator = Arc::clone(&self.aggregator);

        match tokio::spawn(async move { aggregator.run_full_diagnostics().await }).await {
            Ok(snapshot) => HealthVerdict::from_snapshot(&snapshot, self.uptime_seconds()),
            Err(e) => {
                error!(error = %e, "Health check failed");
                HealthVerdict::failed(e.to_string(), self.uptime_seconds())
            }
        }
    }

    pub async fn detailed(&self) -> Report {
        self.reports.generate_report().await
    }

    pub async fn readiness(&self) -> Readiness {
        let verdict = self.status().await.status;
        if verdict.is_serving() {
            Readiness { ready: true, reason: None }
        } else {
            Readiness { ready: false, reason: Some(verdict) }
        }
    }

    pub fn liveness(&self) -> Liveness {
        Liveness { alive: true, timestamp: Utc::now(), uptime_seconds: self.uptime_seconds() }
    }
}
