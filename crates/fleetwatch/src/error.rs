use std::io::Error as IoError;

use thiserror::Error;

/// Failures raised by device probes and device-addressed operations.
///
/// Probe boundaries turn every variant except [`FleetError::UnknownDevice`]
/// into a failed [`crate::ProbeResult`].
#[derive(Debug, Error)]
pub enum FleetError {
    /// Refused, unreachable or unresolvable peer.
    #[error("{0}")]
    Transport(#[from] IoError),

    /// A deadline expired; the payload names what timed out.
    #[error("{0} timeout")]
    Timeout(&'static str),

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    /// Database or query execution failure, opaque to this crate.
    #[error("{0}")]
    UpstreamProtocol(String),
}

impl FleetError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FleetError::Timeout(_))
    }
}
