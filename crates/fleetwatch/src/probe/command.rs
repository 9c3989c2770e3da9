use std::future::Future;
use std::io;
use std::time::Duration;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{error, info};

use crate::error::FleetError;
use crate::registry::DeviceTarget;

/// Characters of a command echoed into the logs
const LOG_PREVIEW_CHARS: usize = 50;

/// Reply of a device to a raw command, trimmed of surrounding whitespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub response: String,
}

impl Serialize for CommandReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CommandReply", 2)?;
        state.serialize_field("success", &true)?;
        state.serialize_field("response", &self.response)?;
        state.end()
    }
}

/// One-shot raw command exchange with a device.
///
/// The payload is written verbatim and everything the peer sends back is
/// collected until it closes the connection. Connections are never reused.
pub struct CommandChannel {
    timeout_duration: Duration,
}

impl CommandChannel {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(timeout_duration: Duration) -> Self {
        Self { timeout_duration }
    }

    pub async fn send(&self, target: &DeviceTarget, command: &[u8]) -> Result<CommandReply, FleetError> {
        let connect = TcpStream::connect((target.host.as_str(), target.port));

        match exchange(connect, command, self.timeout_duration).await {
            Ok(reply) => {
                info!(device = %target.id, command = %preview(command), "Command sent");
                Ok(reply)
            }
            Err(e) => {
                error!(device = %target.id, error = %e, "Command failed");
                Err(e)
            }
        }
    }
}

/// Connect, write `command` and read until the peer closes, all within `deadline`.
///
/// A timeout discards whatever was already received.
pub(crate) async fn exchange<F, S>(connect: F, command: &[u8], deadline: Duration) -> Result<CommandReply, FleetError>
where
    F: Future<Output = io::Result<S>>,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let session = async {
        let mut stream = connect.await?;
        stream.write_all(command).await?;

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await?;
        Ok::<_, io::Error>(response)
    };

    let response = timeout(deadline, session).await.map_err(|_| FleetError::Timeout("Command"))??;

    Ok(CommandReply { response: String::from_utf8_lossy(&response).trim().to_string() })
}

fn preview(command: &[u8]) -> String {
    String::from_utf8_lossy(command).chars().take(LOG_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_reply_collected_until_close() {
        let (client, mut device) = duplex(1024);

        let device_task = tokio::spawn(async move {
            let mut buf = [0u8; 3];
            device.read_exact(&mut buf).await.unwrap();
            assert_eq!(&buf, b"~HS");
            device.write_all(b"\x02030,0,0\r\n").await.unwrap();
            device.write_all(b"001,0,0\x03\r\n  ").await.unwrap();
        });

        let reply = exchange(async { Ok(client) }, b"~HS", CommandChannel::DEFAULT_TIMEOUT).await.unwrap();
        device_task.await.unwrap();

        assert_eq!(reply.response, "\x02030,0,0\r\n001,0,0\x03");
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_peer_times_out_and_discards_partial_reply() {
        let (client, mut device) = duplex(1024);

        let device_task = tokio::spawn(async move {
            device.write_all(b"partial").await.unwrap();
            // hold the stream open past the deadline
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(device);
        });

        let start = Instant::now();
        let err = exchange(async { Ok(client) }, b"^XA^XZ", CommandChannel::DEFAULT_TIMEOUT).await.unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, FleetError::Timeout("Command")));
        assert_eq!(err.to_string(), "Command timeout");
        assert!(elapsed >= Duration::from_millis(10_000));
        assert!(elapsed < Duration::from_millis(10_100));
        device_task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_raised_immediately() {
        let refused = async { Err::<tokio::io::DuplexStream, _>(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused")) };
        let err = exchange(refused, b"PING", CommandChannel::DEFAULT_TIMEOUT).await.unwrap_err();

        assert!(matches!(err, FleetError::Transport(_)));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_reply_serialization() {
        let reply = CommandReply { response: "OK".into() };
        assert_eq!(serde_json::to_string(&reply).unwrap(), r#"{"success":true,"response":"OK"}"#);
    }

    #[test]
    fn test_preview_truncates() {
        let command = "x".repeat(80);
        assert_eq!(preview(command.as_bytes()).len(), LOG_PREVIEW_CHARS);
    }
}
