use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{info, warn};

use super::types::{DiagnosticSnapshot, PrinterStatus};
use crate::config::TimeoutConfig;
use crate::network::{EchoProber, IcmpEchoProber, NetworkHostResult, ReachabilityChecker};
use crate::probe::{
    ConnectionProbe, DatabaseProbe, ProbeResult, QueryExecutor, TransportQueryExecutor, WebStatusProbe,
};
use crate::registry::{DeviceRegistry, DeviceTarget};
use crate::system::{self, SystemReport};

/// Database and printer connections only, without network or system checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickCheck {
    pub timestamp: DateTime<Utc>,
    pub database: BTreeMap<String, ProbeResult>,
    pub printers: BTreeMap<String, ProbeResult>,
}

impl QuickCheck {
    pub fn failed_checks(&self) -> usize {
        self.database.values().chain(self.printers.values()).filter(|r| !r.is_success()).count()
    }
}

/// Fans probes out to every registered device and merges them into a snapshot.
///
/// Holds the single-slot cache of the latest snapshot: each completed pass
/// replaces it, last writer wins.
pub struct StatusAggregator {
    registry: Arc<DeviceRegistry>,
    connection: ConnectionProbe,
    web: WebStatusProbe,
    database: DatabaseProbe,
    network: ReachabilityChecker,
    last_results: RwLock<Option<Arc<DiagnosticSnapshot>>>,
}

impl StatusAggregator {
    pub fn builder(registry: Arc<DeviceRegistry>) -> StatusAggregatorBuilder {
        StatusAggregatorBuilder {
            registry,
            timeouts: TimeoutConfig::default(),
            query_executor: None,
            echo_prober: None,
        }
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    pub fn connection_probe(&self) -> &ConnectionProbe {
        &self.connection
    }

    pub fn web_probe(&self) -> &WebStatusProbe {
        &self.web
    }

    pub fn database_probe(&self) -> &DatabaseProbe {
        &self.database
    }

    /// Run every probe group concurrently and cache the resulting snapshot
    pub async fn run_full_diagnostics(&self) -> Arc<DiagnosticSnapshot> {
        info!("Running full diagnostics...");
        let start = Instant::now();

        let (network, database, printers, system) = tokio::join!(
            self.test_network(),
            self.test_databases(),
            self.test_printers(),
            self.system_info(),
        );

        let snapshot = Arc::new(DiagnosticSnapshot { timestamp: Utc::now(), network, database, printers, system });
        *self.last_results.write().await = Some(Arc::clone(&snapshot));

        info!(
            verdict = %snapshot.verdict(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Full diagnostics completed"
        );
        snapshot
    }

    /// Latest snapshot, if any pass has completed
    pub async fn last_results(&self) -> Option<Arc<DiagnosticSnapshot>> {
        self.last_results.read().await.clone()
    }

    pub async fn test_network(&self) -> BTreeMap<String, NetworkHostResult> {
        self.network.check_all(self.registry.network_hosts()).await
    }

    pub async fn test_databases(&self) -> BTreeMap<String, ProbeResult> {
        let mut results = BTreeMap::new();
        if let Some(target) = self.registry.database() {
            results.insert(target.id.clone(), self.database.probe(target).await);
        }
        results
    }

    pub async fn test_printers(&self) -> BTreeMap<String, PrinterStatus> {
        let statuses = join_all(self.registry.printers().iter().map(|p| self.printer_status(p))).await;

        let mut merged = BTreeMap::new();
        for status in statuses {
            if merged.contains_key(&status.device_id) {
                warn!(device = %status.device_id, "Duplicate printer id, keeping the last result");
            }
            merged.insert(status.device_id.clone(), status);
        }
        merged
    }

    pub async fn printer_status(&self, target: &DeviceTarget) -> PrinterStatus {
        let (connection, web_status) = tokio::join!(self.connection.probe(target), self.web.status(target));

        PrinterStatus {
            device_id: target.id.clone(),
            display_name: target.display_name.clone(),
            host: target.host.clone(),
            connection,
            link_state: self.registry.link_state(&target.id).await,
            web_status,
        }
    }

    pub async fn system_info(&self) -> SystemReport {
        system::collect_system_info().await
    }

    /// Connection-only check of the database and printers
    pub async fn quick_check(&self) -> QuickCheck {
        let printers = async {
            let probes = self.registry.printers().iter().map(|p| async move {
                (p.id.clone(), self.connection.probe(p).await)
            });
            join_all(probes).await.into_iter().collect::<BTreeMap<_, _>>()
        };

        let (database, printers) = tokio::join!(self.test_databases(), printers);
        QuickCheck { timestamp: Utc::now(), database, printers }
    }
}

pub struct StatusAggregatorBuilder {
    registry: Arc<DeviceRegistry>,
    timeouts: TimeoutConfig,
    query_executor: Option<Arc<dyn QueryExecutor>>,
    echo_prober: Option<Arc<dyn EchoProber>>,
}

impl StatusAggregatorBuilder {
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Driver used for the database probe, defaults to [`TransportQueryExecutor`]
    pub fn query_executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.query_executor = Some(executor);
        self
    }

    /// Echo implementation for network checks, defaults to [`IcmpEchoProber`]
    pub fn echo_prober(mut self, prober: Arc<dyn EchoProber>) -> Self {
        self.echo_prober = Some(prober);
        self
    }

    pub fn build(self) -> StatusAggregator {
        let timeouts = self.timeouts;
        let executor: Arc<dyn QueryExecutor> = match self.query_executor {
            Some(executor) => executor,
            None => Arc::new(TransportQueryExecutor::new(timeouts.connect())),
        };
        let prober: Arc<dyn EchoProber> = match self.echo_prober {
            Some(prober) => prober,
            None => Arc::new(IcmpEchoProber::new()),
        };

        StatusAggregator {
            connection: ConnectionProbe::new(Arc::clone(&self.registry), timeouts.connect()),
            web: WebStatusProbe::new(timeouts.web()),
            database: DatabaseProbe::new(executor, timeouts.connect(), timeouts.command()),
            network: ReachabilityChecker::new(prober, timeouts.ping_attempts, timeouts.ping()),
            registry: self.registry,
            last_results: RwLock::new(None),
        }
    }
}
