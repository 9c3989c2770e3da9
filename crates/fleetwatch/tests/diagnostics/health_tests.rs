//! Health verdicts as seen by orchestration probes

use fleetwatch::Verdict;
use fleetwatch::diagnostics::health::HealthDetail;

use crate::support::{context, down_printer, up_printer};

#[tokio::test]
async fn test_healthy_status_and_checks() {
    let (printer_a, _a) = up_printer("printer-a").await;
    let ctx = context(true, vec![printer_a], &[("127.0.0.1", true)]);

    let verdict = ctx.health().status().await;

    assert_eq!(verdict.status, Verdict::Healthy);
    let HealthDetail::Checked { checks } = verdict.detail else {
        panic!("expected checks");
    };
    assert!(checks.database && checks.printers && checks.network);
    assert!(ctx.health().readiness().await.ready);
}

#[tokio::test]
async fn test_critical_is_not_ready() {
    let printer_a = down_printer("printer-a").await;
    let ctx = context(false, vec![printer_a], &[]);

    let verdict = ctx.health().status().await;
    assert_eq!(verdict.status, Verdict::Critical);
    assert!(!verdict.status.is_serving());

    let readiness = ctx.health().readiness().await;
    assert!(!readiness.ready);
    assert_eq!(readiness.reason, Some(Verdict::Critical));
}

#[tokio::test]
async fn test_health_refreshes_last_results() {
    let ctx = context(true, vec![], &[]);

    ctx.health().status().await;

    assert!(ctx.last_results().await.is_some());
    assert!(ctx.health().liveness().alive);
}
