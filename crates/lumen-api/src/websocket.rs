//! Mirror status channel with bounded linear-backoff reconnection.
//!
//! Connects to the facade's `/ws/mirror` socket and streams parsed
//! [`MirrorStatus`] frames through a [`tokio::sync::broadcast`] channel.
//! Connection state is published on a [`tokio::sync::watch`] channel and
//! driven by the pure [`ChannelMachine`](crate::reconnect::ChannelMachine).
//!
//! # Example
//!
//! ```rust,ignore
//! use lumen_api::reconnect::ReconnectPolicy;
//! use lumen_api::transport::TransportConfig;
//! use lumen_api::websocket::MirrorChannel;
//! use tokio_util::sync::CancellationToken;
//!
//! let url = client.mirror_socket_url()?;
//! let connector = TransportConfig::default().websocket_connector()?;
//! let channel = MirrorChannel::connect(url, connector, ReconnectPolicy::default(), CancellationToken::new());
//! let mut rx = channel.subscribe();
//!
//! while let Ok(status) = rx.recv().await {
//!     println!("running={} lights={}", status.running, status.colors.len());
//! }
//!
//! channel.shutdown();
//! ```

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::models::{MirrorCommand, MirrorStatus};
use crate::reconnect::{ChannelEffect, ChannelEvent, ChannelMachine, ChannelState, ReconnectPolicy};

// ── Channel capacities ───────────────────────────────────────────────

const FRAME_CHANNEL_CAPACITY: usize = 256;
const COMMAND_CHANNEL_CAPACITY: usize = 16;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ── MirrorChannel ────────────────────────────────────────────────────

/// Handle to a running mirror channel.
///
/// Dropping the handle does not stop the background task; call
/// [`shutdown`](Self::shutdown) or cancel the token passed to
/// [`connect`](Self::connect).
pub struct MirrorChannel {
    frame_tx: broadcast::Sender<Arc<MirrorStatus>>,
    state_rx: watch::Receiver<ChannelState>,
    command_tx: mpsc::Sender<MirrorCommand>,
    cancel: CancellationToken,
}

impl MirrorChannel {
    /// Spawn the connection loop. Returns immediately; the first
    /// connection attempt happens in the background.
    ///
    /// `connector` comes from
    /// [`TransportConfig::websocket_connector`](crate::transport::TransportConfig::websocket_connector)
    /// and is reused for every reconnect.
    pub fn connect(
        url: Url,
        connector: Option<Connector>,
        policy: ReconnectPolicy,
        cancel: CancellationToken,
    ) -> Self {
        let (frame_tx, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ChannelState::Connecting { attempt: 0 });
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        let task_frames = frame_tx.clone();
        tokio::spawn(async move {
            let target = Target { url, connector };
            channel_loop(target, policy, state_tx, task_frames, command_rx, task_cancel).await;
        });

        Self {
            frame_tx,
            state_rx,
            command_tx,
            cancel,
        }
    }

    /// Get a new receiver for status frames, in arrival order.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<MirrorStatus>> {
        self.frame_tx.subscribe()
    }

    /// Current connection state.
    pub fn state(&self) -> ChannelState {
        *self.state_rx.borrow()
    }

    /// Watch receiver for connection state changes.
    pub fn state_watch(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Queue a command for the socket.
    ///
    /// Fails with [`Error::ChannelNotOpen`] unless the channel is open, so
    /// the caller can fall back to the HTTP endpoint.
    pub fn send(&self, command: MirrorCommand) -> Result<(), Error> {
        if !self.is_open() {
            return Err(Error::ChannelNotOpen);
        }
        self.command_tx
            .try_send(command)
            .map_err(|_| Error::ChannelNotOpen)
    }

    /// Close the socket. No reconnection is attempted afterwards.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background loop ──────────────────────────────────────────────────

/// Where to connect and with which TLS connector.
struct Target {
    url: Url,
    connector: Option<Connector>,
}

/// Carry out machine effects until it gives up or is shut down.
async fn channel_loop(
    target: Target,
    policy: ReconnectPolicy,
    state_tx: watch::Sender<ChannelState>,
    frame_tx: broadcast::Sender<Arc<MirrorStatus>>,
    mut command_rx: mpsc::Receiver<MirrorCommand>,
    cancel: CancellationToken,
) {
    let mut machine = ChannelMachine::new(policy);
    let mut effect = ChannelEffect::Connect;

    loop {
        state_tx.send_replace(machine.state());

        match effect {
            ChannelEffect::Connect => {
                // Commands queued for a previous connection are stale.
                while command_rx.try_recv().is_ok() {}

                let opened = tokio::select! {
                    biased;
                    () = cancel.cancelled() => None,
                    result = open(&target) => Some(result),
                };

                effect = match opened {
                    None => machine.handle(ChannelEvent::Shutdown),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, state = %machine.state(), "mirror socket connect failed");
                        machine.handle(ChannelEvent::Dropped)
                    }
                    Some(Ok(ws)) => {
                        machine.handle(ChannelEvent::Opened);
                        state_tx.send_replace(machine.state());
                        let event = pump(ws, &frame_tx, &mut command_rx, &cancel).await;
                        machine.handle(event)
                    }
                };
            }
            ChannelEffect::ScheduleRetry(delay) => {
                tracing::info!(delay_ms = %delay.as_millis(), state = %machine.state(), "waiting before reconnect");
                effect = tokio::select! {
                    biased;
                    () = cancel.cancelled() => machine.handle(ChannelEvent::Shutdown),
                    () = tokio::time::sleep(delay) => machine.handle(ChannelEvent::RetryElapsed),
                };
            }
            ChannelEffect::GiveUp => {
                tracing::error!(
                    max_retries = machine.policy().max_retries,
                    "mirror socket reconnection limit reached, giving up"
                );
                break;
            }
            ChannelEffect::Stop | ChannelEffect::Idle => break,
        }
    }

    tracing::debug!(state = %machine.state(), "mirror channel loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

async fn open(target: &Target) -> Result<WsStream, Error> {
    tracing::info!(url = %target.url, custom_tls = target.connector.is_some(), "connecting to mirror socket");
    let (ws, _response) = tokio_tungstenite::connect_async_tls_with_config(
        target.url.as_str(),
        None,
        false,
        target.connector.clone(),
    )
    .await
    .map_err(|e| Error::WebSocketConnect(e.to_string()))?;
    tracing::info!("mirror socket connected");
    Ok(ws)
}

/// Read frames and write queued commands until the connection ends.
///
/// Returns [`ChannelEvent::Shutdown`] on cancellation and
/// [`ChannelEvent::Dropped`] for every other way the connection can end.
async fn pump(
    ws: WsStream,
    frame_tx: &broadcast::Sender<Arc<MirrorStatus>>,
    command_rx: &mut mpsc::Receiver<MirrorCommand>,
    cancel: &CancellationToken,
) -> ChannelEvent {
    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    tracing::debug!(error = %e, "close frame not delivered");
                }
                return ChannelEvent::Shutdown;
            }
            Some(command) = command_rx.recv() => {
                let text = match serde_json::to_string(&command) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, "could not encode mirror command");
                        continue;
                    }
                };
                tracing::debug!(%text, "sending mirror command");
                if let Err(e) = write.send(Message::text(text)).await {
                    tracing::warn!(error = %e, "mirror socket write failed");
                    return ChannelEvent::Dropped;
                }
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => parse_and_broadcast(&text, frame_tx),
                    Some(Ok(Message::Ping(_))) => {
                        // tungstenite queues the pong reply
                        tracing::trace!("mirror socket ping");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "mirror socket closed by server");
                        } else {
                            tracing::info!("mirror socket closed by server");
                        }
                        return ChannelEvent::Dropped;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "mirror socket error");
                        return ChannelEvent::Dropped;
                    }
                    None => {
                        tracing::info!("mirror socket stream ended");
                        return ChannelEvent::Dropped;
                    }
                    _ => {
                        // Binary, Pong, Frame -- ignore
                    }
                }
            }
        }
    }
}

// ── Frame parsing ────────────────────────────────────────────────────

/// Parse a text frame and broadcast it. Unparseable frames are skipped.
fn parse_and_broadcast(text: &str, frame_tx: &broadcast::Sender<Arc<MirrorStatus>>) {
    match serde_json::from_str::<MirrorStatus>(text) {
        Ok(status) => {
            // Ignore send errors -- just means no active subscribers right now
            let _ = frame_tx.send(Arc::new(status));
        }
        Err(e) => {
            tracing::debug!(error = %e, "skipping unparseable mirror frame");
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
