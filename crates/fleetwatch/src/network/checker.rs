use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::lookup_host;
use tokio::time::timeout;
use tracing::{debug, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EchoError {
    /// No reply within the attempt deadline
    #[error("Ping timeout")]
    Timeout,

    /// The attempt failed but later attempts may still succeed
    #[error("{0}")]
    Lost(String),

    /// The prober cannot work at all for this host (e.g. raw socket denied)
    #[error("{0}")]
    Fatal(String),
}

/// Sends one echo request and waits for its reply
#[async_trait]
pub trait EchoProber: Send + Sync {
    async fn echo(&self, addr: IpAddr, sequence: u16, timeout: Duration) -> Result<Duration, EchoError>;
}

/// Reachability of one host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkHostResult {
    pub host: String,
    pub alive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NetworkHostResult {
    fn from_round_trips(host: &str, round_trips: &[Duration]) -> Self {
        let millis: Vec<f64> = round_trips.iter().map(|rtt| rtt.as_secs_f64() * 1000.0).collect();

        if millis.is_empty() {
            return Self { host: host.to_string(), alive: false, min_ms: None, max_ms: None, avg_ms: None, error: None };
        }

        let min = millis.iter().copied().fold(f64::INFINITY, f64::min);
        let max = millis.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = millis.iter().sum::<f64>() / millis.len() as f64;

        Self { host: host.to_string(), alive: true, min_ms: Some(min), max_ms: Some(max), avg_ms: Some(avg), error: None }
    }

    fn failed(host: &str, error: impl Into<String>) -> Self {
        Self {
            host: host.to_string(),
            alive: false,
            min_ms: None,
            max_ms: None,
            avg_ms: None,
            error: Some(error.into()),
        }
    }
}

/// ICMP-style reachability checks over a set of hostnames
pub struct ReachabilityChecker {
    prober: Arc<dyn EchoProber>,
    attempts: u16,
    timeout_duration: Duration,
}

impl ReachabilityChecker {
    pub const DEFAULT_ATTEMPTS: u16 = 3;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(prober: Arc<dyn EchoProber>, attempts: u16, timeout_duration: Duration) -> Self {
        Self { prober, attempts, timeout_duration }
    }

    /// Check every host concurrently. A failure for one host never affects the others.
    pub async fn check_all(&self, hosts: &[String]) -> BTreeMap<String, NetworkHostResult> {
        let results = join_all(hosts.iter().map(|host| self.check_host(host))).await;
        results.into_iter().map(|result| (result.host.clone(), result)).collect()
    }

    pub async fn check_host(&self, host: &str) -> NetworkHostResult {
        let addr = match self.resolve(host).await {
            Ok(addr) => addr,
            Err(error) => {
                warn!(host, error = %error, "Host could not be resolved");
                return NetworkHostResult::failed(host, error);
            }
        };

        let mut round_trips = Vec::with_capacity(self.attempts as usize);
        for sequence in 0..self.attempts {
            let attempt = timeout(self.timeout_duration, self.prober.echo(addr, sequence, self.timeout_duration))
                .await
                .unwrap_or(Err(EchoError::Timeout));

            match attempt {
                Ok(rtt) => round_trips.push(rtt),
                Err(EchoError::Fatal(error)) => {
                    warn!(host, error = %error, "Echo probe unavailable");
                    return NetworkHostResult::failed(host, error);
                }
                Err(lost) => debug!(host, sequence, reason = %lost, "Echo attempt lost"),
            }
        }

        let result = NetworkHostResult::from_round_trips(host, &round_trips);
        if result.alive {
            debug!(host, avg_ms = ?result.avg_ms, "Host alive");
        } else {
            warn!(host, attempts = self.attempts, "Host did not answer any echo request");
        }
        result
    }

    async fn resolve(&self, host: &str) -> Result<IpAddr, String> {
        if let Ok(addr) = host.parse::<IpAddr>() {
            return Ok(addr);
        }

        let mut addrs = timeout(self.timeout_duration, lookup_host((host, 0)))
            .await
            .map_err(|_| "Ping timeout".to_string())?
            .map_err(|e| e.to_string())?;

        addrs.next().map(|addr| addr.ip()).ok_or_else(|| format!("No address found for {host}"))
    }
}
