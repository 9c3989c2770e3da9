//! Full diagnostic passes over loopback devices

use std::sync::Arc;

use fleetwatch::registry::LinkState;
use fleetwatch::{FleetError, Verdict};

use crate::support::{context, down_printer, up_printer};

#[tokio::test]
async fn test_all_devices_up_is_healthy() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let (printer_b, _b) = up_printer("printer-b").await;
    let ctx = context(true, vec![printer_a, printer_b], &[("127.0.0.1", true)]);

    let snapshot = ctx.run_full_diagnostics().await;

    assert!(snapshot.database_ok());
    assert!(snapshot.all_printers_ok());
    assert_eq!(snapshot.verdict(), Verdict::Healthy);
    assert!(snapshot.network["127.0.0.1"].alive);
}

#[tokio::test]
async fn test_one_printer_down_is_degraded() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let printer_b = down_printer("printer-b").await;
    let ctx = context(true, vec![printer_a, printer_b], &[]);

    let snapshot = ctx.run_full_diagnostics().await;

    assert!(snapshot.printers["printer-a"].connection.is_success());
    assert!(!snapshot.printers["printer-b"].connection.is_success());
    assert_eq!(snapshot.printers["printer-a"].link_state, LinkState::Online);
    assert_eq!(snapshot.printers["printer-b"].link_state, LinkState::Offline);
    assert_eq!(snapshot.verdict(), Verdict::Degraded);
}

#[tokio::test]
async fn test_database_down_printers_up_is_degraded() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let ctx = context(false, vec![printer_a], &[]);

    let snapshot = ctx.run_full_diagnostics().await;

    assert_eq!(
        snapshot.database["wapromag"].error(),
        Some("Failed to connect to mssql-wapromag:1433")
    );
    assert_eq!(snapshot.verdict(), Verdict::Degraded);
}

#[tokio::test]
async fn test_failures_do_not_stop_other_probes() {
    let printer_a = down_printer("printer-a").await;
    let printer_b = down_printer("printer-b").await;
    let ctx = context(false, vec![printer_a, printer_b], &[("127.0.0.1", false), ("127.0.0.2", true)]);

    let snapshot = ctx.run_full_diagnostics().await;

    assert_eq!(snapshot.printers.len(), 2);
    assert_eq!(snapshot.database.len(), 1);
    assert_eq!(snapshot.network.len(), 2);
    assert!(snapshot.network["127.0.0.2"].alive);
    assert_eq!(snapshot.verdict(), Verdict::Critical);
}

#[tokio::test]
async fn test_network_does_not_enter_verdict() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let ctx = context(true, vec![printer_a], &[("127.0.0.1", false)]);

    let snapshot = ctx.run_full_diagnostics().await;

    assert!(!snapshot.network_ok());
    assert_eq!(snapshot.verdict(), Verdict::Healthy);
}

#[tokio::test]
async fn test_web_status_failure_keeps_connection_truth() {
    let (printer, _listener) = up_printer("printer-a").await;
    let closed_port = down_printer("unused").await.port;
    let ctx = context(true, vec![printer.with_aux_port(closed_port)], &[]);

    let snapshot = ctx.run_full_diagnostics().await;
    let status = &snapshot.printers["printer-a"];

    assert!(status.connection.is_success());
    assert!(!status.web_status.as_ref().unwrap().is_success());
    assert_eq!(snapshot.verdict(), Verdict::Healthy);
}

#[tokio::test]
async fn test_last_results_is_single_slot_cache() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let ctx = context(true, vec![printer_a], &[]);

    assert!(ctx.last_results().await.is_none());

    let first = ctx.run_full_diagnostics().await;
    let cached_once = ctx.last_results().await.unwrap();
    let cached_twice = ctx.last_results().await.unwrap();

    assert!(Arc::ptr_eq(&first, &cached_once));
    assert_eq!(
        serde_json::to_string(&*cached_once).unwrap(),
        serde_json::to_string(&*cached_twice).unwrap()
    );

    let second = ctx.run_full_diagnostics().await;
    let cached = ctx.last_results().await.unwrap();

    assert!(Arc::ptr_eq(&second, &cached));
    assert!(!Arc::ptr_eq(&first, &cached));
}

#[tokio::test]
async fn test_unknown_devices_are_surfaced() {
    let ctx = context(true, vec![], &[]);

    assert!(matches!(ctx.test_printer("zebra-9").await, Err(FleetError::UnknownDevice(id)) if id == "zebra-9"));
    assert!(matches!(ctx.send_command("zebra-9", b"~HS").await, Err(FleetError::UnknownDevice(_))));
    assert!(matches!(ctx.printer_web_status("zebra-9").await, Err(FleetError::UnknownDevice(_))));
    assert!(matches!(ctx.test_database("other").await, Err(FleetError::UnknownDevice(_))));
    assert!(matches!(ctx.execute_query("other", "SELECT 1").await, Err(FleetError::UnknownDevice(_))));
}

#[tokio::test]
async fn test_printer_probe_by_id() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let ctx = context(true, vec![printer_a], &[]);

    let result = ctx.test_printer("printer-a").await.unwrap();
    assert_eq!(result.message(), Some("Connection successful"));

    let web = ctx.printer_web_status("printer-a").await.unwrap();
    assert!(!web.is_success());
}

#[tokio::test]
async fn test_quick_check_skips_network() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let printer_b = down_printer("printer-b").await;
    let ctx = context(true, vec![printer_a, printer_b], &[("127.0.0.1", false)]);

    let quick = ctx.aggregator().quick_check().await;

    assert_eq!(quick.printers.len(), 2);
    assert_eq!(quick.failed_checks(), 1);
    assert!(ctx.last_results().await.is_none());
}
