/// Diagnostics aggregation
///
/// This module is responsible for:
/// - Fanning probes out to every registered device and host
/// - Merging the results into one snapshot and verdict
/// - Deriving reports, recommendations and health probes
/// - Periodic quick checks
pub mod aggregator;
pub mod health;
pub mod report;
pub mod scheduler;
pub mod types;

pub use aggregator::{QuickCheck, StatusAggregator, StatusAggregatorBuilder};
pub use health::{HealthService, HealthVerdict, Liveness, Readiness};
pub use report::ReportGenerator;
pub use scheduler::QuickCheckScheduler;
pub use types::{DiagnosticSnapshot, PrinterStatus, Recommendation, Report, ReportSummary, Severity, Verdict};
