use std::sync::Arc;

use chrono::Utc;

use super::aggregator::StatusAggregator;
use super::types::{DiagnosticSnapshot, Recommendation, Report, ReportSummary, Severity};
use crate::registry::DeviceRegistry;

/// Wraps a diagnostic pass with check counts and recommendations
#[derive(Clone)]
pub struct ReportGenerator {
    aggregator: Arc<StatusAggregator>,
}

impl ReportGenerator {
    pub fn new(aggregator: Arc<StatusAggregator>) -> Self {
        Self { aggregator }
    }

    pub async fn generate_report(&self) -> Report {
        let snapshot = self.aggregator.run_full_diagnostics().await;
        build_report(&snapshot, self.aggregator.registry())
    }
}

pub fn build_report(snapshot: &DiagnosticSnapshot, registry: &DeviceRegistry) -> Report {
    Report {
        generated: Utc::now(),
        summary: summarize(snapshot),
        details: snapshot.clone(),
        recommendations: recommendations(snapshot, registry),
    }
}

pub fn summarize(snapshot: &DiagnosticSnapshot) -> ReportSummary {
    let total_checks = snapshot.network.len() + snapshot.database.len() + snapshot.printers.len();

    let passed_checks = snapshot.network.values().filter(|n| n.alive).count()
        + snapshot.database.values().filter(|d| d.is_success()).count()
        + snapshot.printers.values().filter(|p| p.connection.is_success()).count();

    ReportSummary {
        overall_status: snapshot.verdict(),
        total_checks,
        passed_checks,
        // derived, so passed + failed == total always holds
        failed_checks: total_checks - passed_checks,
    }
}

/// Recommendations for failing checks: database, then printers and hosts in registry order
pub fn recommendations(snapshot: &DiagnosticSnapshot, registry: &DeviceRegistry) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if !snapshot.database_ok() {
        let message = match registry.database() {
            Some(db) => format!(
                "No connection to database {} - check its configuration and server availability",
                db.id
            ),
            None => "No database target is configured".to_string(),
        };
        recommendations.push(Recommendation {
            severity: Severity::Critical,
            component: "Database".to_string(),
            message,
        });
    }

    for printer in registry.printers() {
        let Some(status) = snapshot.printers.get(&printer.id) else { continue };
        if !status.connection.is_success() {
            recommendations.push(Recommendation {
                severity: Severity::Warning,
                component: printer.id.clone(),
                message: format!(
                    "Printer {} ({}) is unreachable - check its network connection",
                    printer.display_name, printer.id
                ),
            });
        }
    }

    for host in registry.network_hosts() {
        let Some(result) = snapshot.network.get(host) else { continue };
        if !result.alive {
            recommendations.push(Recommendation {
                severity: Severity::Error,
                component: host.clone(),
                message: format!("Host {host} does not answer ping - check network connectivity"),
            });
        }
    }

    recommendations
}
