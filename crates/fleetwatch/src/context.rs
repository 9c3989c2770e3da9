//! The explicit process-wide context.
//!
//! All shared state lives here: the immutable [`DeviceRegistry`] and, inside
//! the [`StatusAggregator`], the single-slot cache of the latest snapshot.
//! Build one context at start-up and share it by reference or `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{ConfigError, FleetConfig, TimeoutConfig};
use crate::diagnostics::{
    DiagnosticSnapshot, HealthService, PrinterStatus, QuickCheck, QuickCheckScheduler, Report,
    ReportGenerator, StatusAggregator,
};
use crate::error::FleetError;
use crate::network::EchoProber;
use crate::probe::{CommandChannel, CommandReply, ProbeResult, QueryExecutor, QueryOutput};
use crate::registry::DeviceRegistry;
use crate::zpl;

pub struct DiagnosticsContext {
    registry: Arc<DeviceRegistry>,
    aggregator: Arc<StatusAggregator>,
    reports: ReportGenerator,
    health: HealthService,
    commands: CommandChannel,
}

impl DiagnosticsContext {
    /// Build a context with the bundled transport executor and ICMP prober
    pub fn from_config(config: &FleetConfig) -> Result<Self, ConfigError> {
        config.timeouts.validate()?;
        let registry = Arc::new(DeviceRegistry::from_config(config)?);
        Ok(Self::builder(registry).timeouts(config.timeouts.clone()).build())
    }

    pub fn builder(registry: Arc<DeviceRegistry>) -> DiagnosticsContextBuilder {
        DiagnosticsContextBuilder {
            registry,
            timeouts: TimeoutConfig::default(),
            query_executor: None,
            echo_prober: None,
        }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn aggregator(&self) -> &Arc<StatusAggregator> {
        &self.aggregator
    }

    pub fn health(&self) -> &HealthService {
        &self.health
    }

    pub async fn run_full_diagnostics(&self) -> Arc<DiagnosticSnapshot> {
        self.aggregator.run_full_diagnostics().await
    }

    pub async fn last_results(&self) -> Option<Arc<DiagnosticSnapshot>> {
        self.aggregator.last_results().await
    }

    pub async fn generate_report(&self) -> Report {
        self.reports.generate_report().await
    }

    pub async fn test_printer(&self, printer_id: &str) -> Result<ProbeResult, FleetError> {
        let target = self.registry.printer(printer_id)?;
        Ok(self.aggregator.connection_probe().probe(target).await)
    }

    /// Status page of one printer; a failure when it has none configured
    pub async fn printer_web_status(&self, printer_id: &str) -> Result<ProbeResult, FleetError> {
        let target = self.registry.printer(printer_id)?;
        Ok(self
            .aggregator
            .web_probe()
            .status(target)
            .await
            .unwrap_or_else(|| ProbeResult::failure(format!("No status port configured for {printer_id}"))))
    }

    pub async fn all_printers_status(&self) -> BTreeMap<String, PrinterStatus> {
        self.aggregator.test_printers().await
    }

    pub async fn send_command(&self, printer_id: &str, command: &[u8]) -> Result<CommandReply, FleetError> {
        let target = self.registry.printer(printer_id)?;
        self.commands.send(target, command).await
    }

    pub async fn print_test_label(&self, printer_id: &str) -> Result<CommandReply, FleetError> {
        let label = zpl::test_label(printer_id, Utc::now());
        self.send_command(printer_id, label.as_bytes()).await
    }

    pub async fn test_database(&self, database_id: &str) -> Result<ProbeResult, FleetError> {
        let target = self.registry.database_by_id(database_id)?;
        Ok(self.aggregator.database_probe().probe(target).await)
    }

    pub async fn execute_query(&self, database_id: &str, query: &str) -> Result<QueryOutput, FleetError> {
        let target = self.registry.database_by_id(database_id)?;
        self.aggregator.database_probe().execute(target, query).await
    }

    pub async fn list_tables(&self, database_id: &str) -> Result<QueryOutput, FleetError> {
        let target = self.registry.database_by_id(database_id)?;
        self.aggregator.database_probe().list_tables(target).await
    }

    pub async fn table_schema(&self, database_id: &str, table: &str) -> Result<QueryOutput, FleetError> {
        let target = self.registry.database_by_id(database_id)?;
        self.aggregator.database_probe().table_schema(target, table).await
    }

    /// Spawn the periodic quick check, publishing results on `result_tx`.
    /// A zero period disables it.
    pub fn start_quick_checks(&self, period: Duration, result_tx: mpsc::Sender<QuickCheck>) -> Option<JoinHandle<()>> {
        QuickCheckScheduler::new(Arc::clone(&self.aggregator), result_tx).start(period)
    }
}

pub struct DiagnosticsContextBuilder {
    registry: Arc<DeviceRegistry>,
    timeouts: TimeoutConfig,
    query_executor: Option<Arc<dyn QueryExecutor>>,
    echo_prober: Option<Arc<dyn EchoProber>>,
}

impl DiagnosticsContextBuilder {
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn query_executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.query_executor = Some(executor);
        self
    }

    pub fn echo_prober(mut self, prober: Arc<dyn EchoProber>) -> Self {
        self.echo_prober = Some(prober);
        self
    }

    pub fn build(self) -> DiagnosticsContext {
        let mut aggregator = StatusAggregator::builder(Arc::clone(&self.registry)).timeouts(self.timeouts.clone());
        if let Some(executor) = self.query_executor {
            aggregator = aggregator.query_executor(executor);
        }
        if let Some(prober) = self.echo_prober {
            aggregator = aggregator.echo_prober(prober);
        }
        let aggregator = Arc::new(aggregator.build());

        DiagnosticsContext {
            registry: self.registry,
            reports: ReportGenerator::new(Arc::clone(&aggregator)),
            health: HealthService::new(Arc::clone(&aggregator)),
            commands: CommandChannel::new(self.timeouts.command()),
            aggregator,
        }
    }
}
