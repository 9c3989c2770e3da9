use std::io::ErrorKind;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence, SurgeError};

use super::checker::{EchoError, EchoProber};

const PAYLOAD: [u8; 56] = [0; 56];

/// ICMP echo prober backed by `surge-ping`
///
/// Needs a raw or datagram ICMP socket. Where the process lacks that
/// permission every echo fails with [`EchoError::Fatal`].
#[derive(Debug, Default, Clone, Copy)]
pub struct IcmpEchoProber;

impl IcmpEchoProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EchoProber for IcmpEchoProber {
    async fn echo(&self, addr: IpAddr, sequence: u16, timeout: Duration) -> Result<Duration, EchoError> {
        let config = match addr {
            IpAddr::V4(_) => Config::default(),
            IpAddr::V6(_) => Config::builder().kind(ICMP::V6).build(),
        };

        let client = Client::new(&config).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => EchoError::Fatal(format!("ICMP socket not permitted: {e}")),
            _ => EchoError::Fatal(format!("ICMP socket unavailable: {e}")),
        })?;

        let mut pinger = client.pinger(addr, PingIdentifier(rand::random())).await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(sequence), &PAYLOAD).await {
            Ok((_packet, rtt)) => Ok(rtt),
            Err(SurgeError::Timeout { .. }) => Err(EchoError::Timeout),
            Err(e) => Err(EchoError::Lost(e.to_string())),
        }
    }
}
