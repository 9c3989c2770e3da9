//! Reports over real diagnostic passes

use fleetwatch::diagnostics::Severity;
use fleetwatch::{DeviceRegistry, DiagnosticsContext, Verdict};
use std::sync::Arc;

use crate::support::{FakeDatabase, context, down_printer, up_printer};

#[tokio::test]
async fn test_database_down_and_one_printer_down_is_critical() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let printer_b = down_printer("printer-b").await;
    let ctx = context(false, vec![printer_a, printer_b], &[("127.0.0.1", true)]);

    let report = ctx.generate_report().await;

    assert_eq!(report.summary.overall_status, Verdict::Critical);
    assert_eq!(report.summary.total_checks, 4);
    assert_eq!(report.summary.passed_checks, 2);
    assert_eq!(report.summary.failed_checks, 2);

    let recs: Vec<_> = report.recommendations.iter().map(|r| (r.severity, r.component.as_str())).collect();
    assert_eq!(recs, [(Severity::Critical, "Database"), (Severity::Warning, "printer-b")]);
}

#[tokio::test]
async fn test_healthy_report_has_no_recommendations() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let (printer_b, _b) = up_printer("printer-b").await;
    let ctx = context(true, vec![printer_a, printer_b], &[("127.0.0.1", true), ("127.0.0.2", true)]);

    let report = ctx.generate_report().await;

    assert_eq!(report.summary.overall_status, Verdict::Healthy);
    assert_eq!(report.summary.failed_checks, 0);
    assert!(report.recommendations.is_empty());
}

#[tokio::test]
async fn test_unreachable_host_yields_error_recommendation() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let ctx = context(true, vec![printer_a], &[("127.0.0.1", true), ("127.0.0.2", false)]);

    let report = ctx.generate_report().await;

    assert_eq!(report.summary.overall_status, Verdict::Healthy);
    assert_eq!(report.recommendations.len(), 1);
    assert_eq!(report.recommendations[0].severity, Severity::Error);
    assert_eq!(report.recommendations[0].component, "127.0.0.2");
}

#[tokio::test]
async fn test_empty_registry_report() {
    let ctx = DiagnosticsContext::builder(Arc::new(DeviceRegistry::empty()))
        .query_executor(Arc::new(FakeDatabase { up: true }))
        .build();

    let report = ctx.generate_report().await;

    assert_eq!(report.summary.total_checks, 0);
    assert_eq!(report.summary.passed_checks + report.summary.failed_checks, 0);
    assert_eq!(report.recommendations.len(), 1);
    assert_eq!(report.recommendations[0].severity, Severity::Critical);
}

#[tokio::test]
async fn test_report_json_shape() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let ctx = context(true, vec![printer_a], &[]);

    let value = serde_json::to_value(ctx.generate_report().await).unwrap();

    assert!(value["generated"].is_string());
    assert_eq!(value["summary"]["overall_status"], "HEALTHY");
    assert_eq!(value["details"]["printers"]["printer-a"]["connection"]["success"], true);
    assert_eq!(value["details"]["printers"]["printer-a"]["deviceId"], "printer-a");
    assert_eq!(value["details"]["printers"]["printer-a"]["linkState"], "online");
    assert_eq!(value["details"]["database"]["wapromag"]["message"], "Connection successful");
    assert!(value["recommendations"].as_array().unwrap().is_empty());
}
