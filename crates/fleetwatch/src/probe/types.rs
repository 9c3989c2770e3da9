use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a single probe: either a message or an error, never both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success(String),
    Failure(String),
}

/// Result of a single probe
///
/// Serialized as `{success, message?, error?, elapsedMs?, details?}` where
/// exactly one of `message`/`error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ProbeResultWire", try_from = "ProbeResultWire")]
pub struct ProbeResult {
    pub outcome: ProbeOutcome,

    /// Time spent in the probe in milliseconds
    pub elapsed_ms: Option<u64>,

    /// Payload reported by the device (web status body)
    pub details: Option<Value>,
}

impl ProbeResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self { outcome: ProbeOutcome::Success(message.into()), elapsed_ms: None, details: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { outcome: ProbeOutcome::Failure(error.into()), elapsed_ms: None, details: None }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = Some(elapsed.as_millis() as u64);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Success(_))
    }

    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            ProbeOutcome::Success(message) => Some(message),
            ProbeOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ProbeOutcome::Success(_) => None,
            ProbeOutcome::Failure(error) => Some(error),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProbeResultWire {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<ProbeResult> for ProbeResultWire {
    fn from(result: ProbeResult) -> Self {
        let (success, message, error) = match result.outcome {
            ProbeOutcome::Success(message) => (true, Some(message), None),
            ProbeOutcome::Failure(error) => (false, None, Some(error)),
        };
        Self { success, message, error, elapsed_ms: result.elapsed_ms, details: result.details }
    }
}

impl TryFrom<ProbeResultWire> for ProbeResult {
    type Error = String;

    fn try_from(wire: ProbeResultWire) -> Result<Self, Self::Error> {
        let outcome = match (wire.success, wire.message, wire.error) {
            (true, message, None) => ProbeOutcome::Success(message.unwrap_or_default()),
            (false, None, Some(error)) => ProbeOutcome::Failure(error),
            (true, _, Some(_)) => return Err("successful probe must not carry an error".into()),
            (false, _, _) => return Err("failed probe must carry only an error".into()),
        };
        Ok(Self { outcome, elapsed_ms: wire.elapsed_ms, details: wire.details })
    }
}
