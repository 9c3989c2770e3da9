//! Fleetwatch - device health and diagnostics aggregation
//!
//! This library probes a small, statically configured fleet of networked
//! peripherals (a SQL database host and label printers), merges the per-device
//! results into one health verdict and derives operator recommendations.

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod network;
pub mod probe;
pub mod registry;
pub mod system;
pub mod zpl;

// Re-export main types
pub use config::FleetConfig;
pub use context::DiagnosticsContext;
pub use diagnostics::{
    DiagnosticSnapshot, HealthVerdict, Recommendation, Report, ReportGenerator, StatusAggregator,
    Verdict,
};
pub use error::FleetError;
pub use probe::{CommandChannel, CommandReply, ConnectionProbe, ProbeResult};
pub use registry::{DeviceKind, DeviceRegistry, DeviceTarget};

/// Fleetwatch result type
pub type Result<T> = std::result::Result<T, FleetError>;
