/// Device probes
///
/// Every probe is a single timed attempt over its own connection:
/// - `connection`: transport-level reachability (5 s deadline)
/// - `command`: raw command/response exchange with a printer (10 s deadline)
/// - `web`: best-effort printer status page
/// - `database`: database connectivity through a pluggable executor
pub mod command;
pub mod connection;
pub mod database;
pub mod types;
pub mod web;

pub use command::{CommandChannel, CommandReply};
pub use connection::ConnectionProbe;
pub use database::{DatabaseProbe, QueryExecutor, QueryOutput, TransportQueryExecutor};
pub use types::{ProbeOutcome, ProbeResult};
pub use web::WebStatusProbe;
