use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{Instant, timeout};
use tracing::{debug, warn};

use super::types::ProbeResult;
use crate::error::FleetError;
use crate::registry::{DeviceRegistry, DeviceTarget, LinkState};

/// Transport-level reachability probe.
///
/// Opens a TCP connection to the target and closes it immediately, without
/// exchanging any data.
pub struct ConnectionProbe {
    registry: Arc<DeviceRegistry>,
    timeout_duration: Duration,
}

impl ConnectionProbe {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(registry: Arc<DeviceRegistry>, timeout_duration: Duration) -> Self {
        Self { registry, timeout_duration }
    }

    /// Probe `target` and record its link state in the registry.
    pub async fn probe(&self, target: &DeviceTarget) -> ProbeResult {
        let connect = TcpStream::connect((target.host.as_str(), target.port));
        let result = race_connect(connect, self.timeout_duration).await;

        let state = if result.is_success() { LinkState::Online } else { LinkState::Offline };
        self.registry.set_link_state(&target.id, state).await;

        match result.error() {
            None => debug!(device = %target.id, elapsed_ms = ?result.elapsed_ms, "Connection probe succeeded"),
            Some(error) => warn!(device = %target.id, address = %target.address(), error, "Connection probe failed"),
        }

        result
    }
}

/// Resolve a connection attempt against a deadline.
///
/// Whichever of connect, error or deadline comes first decides the result;
/// the attempt is dropped on timeout.
pub(crate) async fn race_connect<F, S>(connect: F, deadline: Duration) -> ProbeResult
where
    F: Future<Output = io::Result<S>>,
{
    let start = Instant::now();

    let result = match timeout(deadline, connect).await {
        Ok(Ok(stream)) => {
            drop(stream);
            ProbeResult::success("Connection successful")
        }
        Ok(Err(e)) => ProbeResult::failure(FleetError::from(e).to_string()),
        Err(_) => ProbeResult::failure(FleetError::Timeout("Connection").to_string()),
    };

    result.with_elapsed(start.elapsed())
}
