#![allow(clippy::unwrap_used)]
// Integration tests for `MirrorChannel` against a local socket server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use lumen_api::models::MirrorCommand;
use lumen_api::transport::{TlsMode, TransportConfig};
use lumen_api::{ChannelState, MirrorChannel, ReconnectPolicy};

// ── Helpers ─────────────────────────────────────────────────────────

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy {
        base_delay: Duration::from_millis(5),
        max_retries: 5,
    }
}

async fn bind() -> (TcpListener, Url) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = Url::parse(&format!("ws://{addr}/ws/mirror")).unwrap();
    (listener, url)
}

async fn wait_for_state(channel: &MirrorChannel, pred: impl FnMut(&ChannelState) -> bool) {
    let mut rx = channel.state_watch();
    tokio::time::timeout(TEST_TIMEOUT, rx.wait_for(pred))
        .await
        .expect("timed out waiting for channel state")
        .unwrap();
}

// ── Reconnection ────────────────────────────────────────────────────

#[tokio::test]
async fn test_gives_up_after_initial_plus_five_retries() {
    let (listener, url) = bind().await;
    let accepts = Arc::new(AtomicUsize::new(0));

    let server_accepts = Arc::clone(&accepts);
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let n = server_accepts.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                // First client: complete the handshake, then close.
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                ws.close(None).await.ok();
            } else {
                // Every retry: drop the TCP connection before the handshake.
                drop(stream);
            }
        }
    });

    let channel = MirrorChannel::connect(url, None, fast_policy(), CancellationToken::new());
    wait_for_state(&channel, |s| *s == ChannelState::ClosedTerminal).await;

    assert_eq!(accepts.load(Ordering::SeqCst), 6);
    assert!(!channel.is_open());
    assert!(channel.send(MirrorCommand::Stop).is_err());

    // Terminal means terminal: no further attempts arrive.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(accepts.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_shutdown_does_not_reconnect() {
    let (listener, url) = bind().await;
    let accepts = Arc::new(AtomicUsize::new(0));

    let server_accepts = Arc::clone(&accepts);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            server_accepts.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                // Drain until the client goes away.
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });

    let channel = MirrorChannel::connect(url, None, fast_policy(), CancellationToken::new());
    wait_for_state(&channel, |s| s.is_open()).await;

    channel.shutdown();
    wait_for_state(&channel, |s| *s == ChannelState::TornDown).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(accepts.load(Ordering::SeqCst), 1);
    assert_eq!(channel.state(), ChannelState::TornDown);
}

#[tokio::test]
async fn test_custom_tls_connector_still_opens_plain_sockets() {
    let (listener, url) = bind().await;
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let transport = TransportConfig {
        tls: TlsMode::DangerAcceptInvalid,
        ..TransportConfig::default()
    };
    let connector = transport.websocket_connector().unwrap();
    assert!(connector.is_some());

    let channel = MirrorChannel::connect(url, connector, fast_policy(), CancellationToken::new());
    wait_for_state(&channel, |s| s.is_open()).await;
    channel.shutdown();
}

// ── Frames and commands ─────────────────────────────────────────────

#[tokio::test]
async fn test_frames_arrive_in_order_and_commands_reach_server() {
    let (listener, url) = bind().await;
    let (cmd_tx, mut cmd_rx) = tokio::sync::mpsc::unbounded_channel::<serde_json::Value>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        // Wait for the client's start command before streaming.
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                let value: serde_json::Value = serde_json::from_str(&text).unwrap();
                cmd_tx.send(value).unwrap();
                break;
            }
        }

        for frame in [
            r#"{"running":true,"fps":25,"brightness":200,"colors":{"Left":[255,0,0]}}"#,
            "garbage frame",
            r#"{"running":true,"fps":25,"brightness":200,"colors":{"Left":[0,255,0]}}"#,
            r#"{"running":false,"fps":25,"brightness":200,"colors":{"Left":[0,255,0]}}"#,
        ] {
            ws.send(Message::text(frame.to_string())).await.unwrap();
        }

        while let Some(Ok(_)) = ws.next().await {}
    });

    let channel = MirrorChannel::connect(url, None, fast_policy(), CancellationToken::new());
    let mut frames = channel.subscribe();
    wait_for_state(&channel, |s| s.is_open()).await;

    channel
        .send(MirrorCommand::Start {
            fps: 30,
            brightness: 180,
        })
        .unwrap();

    let command = tokio::time::timeout(TEST_TIMEOUT, cmd_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        command,
        serde_json::json!({"action": "start", "fps": 30, "brightness": 180})
    );

    let mut received = Vec::new();
    for _ in 0..3 {
        let status = tokio::time::timeout(TEST_TIMEOUT, frames.recv())
            .await
            .unwrap()
            .unwrap();
        received.push((status.running, status.colors.get("Left").copied()));
    }

    assert_eq!(
        received,
        vec![
            (true, Some([255, 0, 0])),
            (true, Some([0, 255, 0])),
            (false, Some([0, 255, 0])),
        ]
    );

    channel.shutdown();
}
