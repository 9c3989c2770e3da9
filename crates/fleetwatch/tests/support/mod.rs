//! Fake devices shared by the integration tests

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fleetwatch::network::{EchoError, EchoProber};
use fleetwatch::probe::{QueryExecutor, QueryOutput};
use fleetwatch::{DeviceRegistry, DeviceTarget, DiagnosticsContext, FleetError};
use tokio::net::TcpListener;

/// Database whose connectivity is fixed at construction
pub struct FakeDatabase {
    pub up: bool,
}

#[async_trait]
impl QueryExecutor for FakeDatabase {
    async fn test_connection(&self, _target: &DeviceTarget) -> Result<(), FleetError> {
        if self.up {
            Ok(())
        } else {
            Err(FleetError::UpstreamProtocol("Failed to connect to mssql-wapromag:1433".into()))
        }
    }

    async fn execute_query(&self, _target: &DeviceTarget, _query: &str) -> Result<QueryOutput, FleetError> {
        Ok(QueryOutput { recordset: vec![], rows_affected: vec![1] })
    }
}

/// Answers echo requests for a fixed set of addresses
pub struct FakeEcho {
    pub alive: HashSet<IpAddr>,
}

#[async_trait]
impl EchoProber for FakeEcho {
    async fn echo(&self, addr: IpAddr, _sequence: u16, _timeout: Duration) -> Result<Duration, EchoError> {
        if self.alive.contains(&addr) { Ok(Duration::from_millis(2)) } else { Err(EchoError::Timeout) }
    }
}

/// A printer that accepts connections for as long as the listener lives
pub async fn up_printer(id: &str) -> (DeviceTarget, TcpListener) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (DeviceTarget::printer(id, "127.0.0.1", port), listener)
}

/// A printer whose port refuses connections
pub async fn down_printer(id: &str) -> DeviceTarget {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    DeviceTarget::printer(id, "127.0.0.1", port)
}

/// Build a context over the given printers and `(host, alive)` pairs
pub fn context(database_up: bool, printers: Vec<DeviceTarget>, hosts: &[(&str, bool)]) -> DiagnosticsContext {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let registry = DeviceRegistry::new(
        Some(DeviceTarget::database("wapromag", "127.0.0.1", 1433)),
        printers,
        hosts.iter().map(|(host, _)| host.to_string()).collect(),
    )
    .unwrap();

    let alive = hosts.iter().filter(|(_, alive)| *alive).map(|(host, _)| host.parse().unwrap()).collect();

    DiagnosticsContext::builder(Arc::new(registry))
        .query_executor(Arc::new(FakeDatabase { up: database_up }))
        .echo_prober(Arc::new(FakeEcho { alive }))
        .build()
}
