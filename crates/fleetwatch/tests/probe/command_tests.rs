//! Raw command exchanges against loopback devices

use fleetwatch::FleetError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::support::{context, down_printer, up_printer};

/// Accept one connection, read until `terminator`, reply and close.
/// Resolves to the bytes received.
fn serve_once(listener: TcpListener, terminator: &'static [u8], reply: &'static [u8]) -> JoinHandle<Vec<u8>> {
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];

        while !received.windows(terminator.len()).any(|w| w == terminator) {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
        }

        socket.write_all(reply).await.unwrap();
        socket.shutdown().await.unwrap();
        received
    })
}

#[tokio::test]
async fn test_command_reply_is_trimmed() {
    let (printer, listener) = up_printer("zebra-1").await;
    let device = serve_once(listener, b"~HS", b"  \x02030,0,0,1245,000,0,0,0,000,0,0,0\x03\r\n");
    let ctx = context(true, vec![printer], &[]);

    let reply = ctx.send_command("zebra-1", b"~HS").await.unwrap();

    assert_eq!(device.await.unwrap(), b"~HS");
    assert_eq!(reply.response, "\u{2}030,0,0,1245,000,0,0,0,000,0,0,0\u{3}");
}

#[tokio::test]
async fn test_command_reply_json() {
    let (printer, listener) = up_printer("zebra-1").await;
    let _device = serve_once(listener, b"PING", b"PONG\n");
    let ctx = context(true, vec![printer], &[]);

    let reply = ctx.send_command("zebra-1", b"PING").await.unwrap();

    assert_eq!(serde_json::to_value(reply).unwrap(), serde_json::json!({"success": true, "response": "PONG"}));
}

#[tokio::test]
async fn test_silent_device_yields_empty_reply() {
    let (printer, listener) = up_printer("zebra-1").await;
    let _device = serve_once(listener, b"^XZ", b"");
    let ctx = context(true, vec![printer], &[]);

    let reply = ctx.send_command("zebra-1", b"^XA^FDhello^FS^XZ").await.unwrap();

    assert_eq!(reply.response, "");
}

#[tokio::test]
async fn test_print_test_label_sends_label() {
    let (printer, listener) = up_printer("zebra-2").await;
    let device = serve_once(listener, b"^XZ", b"");
    let ctx = context(true, vec![printer], &[]);

    ctx.print_test_label("zebra-2").await.unwrap();

    let label = String::from_utf8(device.await.unwrap()).unwrap();
    assert!(label.contains("^XA"));
    assert!(label.contains("^FDPrinter: zebra-2^FS"));
    assert!(label.contains("^BCN,100,Y,N,N"));
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    let printer = down_printer("zebra-1").await;
    let ctx = context(true, vec![printer], &[]);

    let err = ctx.send_command("zebra-1", b"~HS").await.unwrap_err();

    assert!(matches!(err, FleetError::Transport(_)));
    assert!(!err.is_timeout());
}
