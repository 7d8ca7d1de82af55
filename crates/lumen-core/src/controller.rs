// ── Controller abstraction ──
//
// Owns every piece of client state for one bridge facade: the HTTP
// client, the live store, the status poller and its timer, and the
// mirror socket. Background tasks feed the store; commands route through
// a single processor task.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use lumen_api::models::{MirrorCommand, MirrorStatus};
use lumen_api::{BridgeClient, ChannelState, MirrorChannel};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope, CommandResult, CommandRoute, MirrorDispatch};
use crate::config::BridgeConfig;
use crate::error::CoreError;
use crate::model::{
    ApplyOutcome, ApplyRequest, Configuration, MirrorSettings, MirrorSnapshot,
    MirrorStartRequest, PositionMap,
};
use crate::poller::{RefreshOutcome, RefreshTimer, StatusPoller};
use crate::store::{
    BridgeView, LightsView, LiveStore, MirrorView, PositionsView, Snapshot, Source, Subscription,
};

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: BridgeConfig,
    client: BridgeClient,
    store: Arc<LiveStore>,
    poller: Arc<StatusPoller>,
    timer: RefreshTimer,
    channel: Mutex<Option<MirrorChannel>>,
    channel_state: watch::Sender<ChannelState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    connected: AtomicBool,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller. Does NOT connect; call
    /// [`connect()`](Self::connect) to start background tasks.
    pub fn new(config: BridgeConfig) -> Result<Self, CoreError> {
        let client = BridgeClient::new(config.url.clone(), &config.transport())?;
        let store = Arc::new(LiveStore::new());
        let poller = Arc::new(StatusPoller::new(client.clone(), Arc::clone(&store)));
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                store,
                poller,
                timer: RefreshTimer::new(),
                channel: Mutex::new(None),
                channel_state: watch::Sender::new(ChannelState::TornDown),
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                connected: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &BridgeClient {
        &self.inner.client
    }

    pub fn store(&self) -> &Arc<LiveStore> {
        &self.inner.store
    }

    pub fn poller(&self) -> &Arc<StatusPoller> {
        &self.inner.poller
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Start background tasks: the command processor, the status timer
    /// (if `poll_interval` is non-zero) and the mirror socket (if enabled).
    ///
    /// Calling it again while connected is a no-op. A controller that has
    /// been disconnected cannot be reconnected; create a new one.
    pub async fn connect(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::NotConnected);
        }
        let config = &self.inner.config;
        let socket = if config.websocket_enabled {
            let url = self.inner.client.mirror_socket_url()?;
            Some((url, config.transport().websocket_connector()?))
        } else {
            None
        };
        if self.inner.connected.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        if !config.poll_interval.is_zero() {
            let poller = Arc::clone(&self.inner.poller);
            self.inner.timer.start(config.poll_interval, move || {
                let poller = Arc::clone(&poller);
                async move {
                    poller.refresh_all().await;
                }
            });
        }

        if let Some((url, connector)) = socket {
            debug!(%url, "opening mirror channel");
            let channel = MirrorChannel::connect(
                url,
                connector,
                config.reconnect,
                self.inner.cancel.child_token(),
            );
            let frames = channel.subscribe();
            let states = channel.state_watch();
            *self.inner.channel.lock().await = Some(channel);

            let ctrl = self.clone();
            handles.push(tokio::spawn(channel_forward_task(ctrl, frames, states)));

            let ctrl = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(async move {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {}
                    () = initial_mirror_status(&ctrl) => {}
                }
            }));
        }

        info!(url = %config.url, "connected to bridge facade");
        Ok(())
    }

    /// Stop every background task and close the mirror socket. The
    /// socket is torn down, not retried.
    pub async fn disconnect(&self) {
        self.inner.timer.stop();
        if let Some(channel) = self.inner.channel.lock().await.take() {
            channel.shutdown();
        }
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner.channel_state.send_replace(ChannelState::TornDown);
        self.inner.connected.store(false, Ordering::Release);
        debug!("disconnected");
    }

    /// One-shot: connect, run closure, disconnect.
    ///
    /// For the CLI: disables the socket and the status timer since only
    /// a single request-response cycle is needed.
    pub async fn oneshot<F, Fut, T>(config: BridgeConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.websocket_enabled = false;
        cfg.poll_interval = std::time::Duration::ZERO;

        let controller = Controller::new(cfg)?;
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command through the command processor and await the
    /// result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if !self.is_connected() {
            return Err(CoreError::NotConnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::NotConnected)?;

        rx.await.map_err(|_| CoreError::NotConnected)?
    }

    // ── Configurations ───────────────────────────────────────────

    pub async fn configurations(&self) -> Result<Vec<Configuration>, CoreError> {
        let configs = self.inner.client.list_configurations().await?;
        Ok(configs.into_iter().map(Configuration::from).collect())
    }

    pub async fn apply(&self, request: &ApplyRequest) -> Result<ApplyOutcome, CoreError> {
        let response = self
            .inner
            .client
            .apply_configuration(&request.into())
            .await?;
        info!(config = request.config_name(), "configuration applied");
        Ok(ApplyOutcome {
            config_name: request.config_name().to_owned(),
            message: response.message,
        })
    }

    /// Validate raw form input and apply. Rejected input never reaches
    /// the network.
    pub async fn apply_form(
        &self,
        name: &str,
        transition: &str,
        duration: &str,
    ) -> Result<ApplyOutcome, CoreError> {
        let request = ApplyRequest::from_form(name, transition, duration)?;
        self.apply(&request).await
    }

    // ── Status ───────────────────────────────────────────────────

    pub async fn refresh_lights(&self) -> RefreshOutcome {
        self.inner.poller.refresh_light_status().await
    }

    pub async fn refresh_bridge(&self) -> RefreshOutcome {
        self.inner.poller.refresh_bridge_status().await
    }

    /// Fetch the mirror status over HTTP and publish it.
    pub async fn mirror_status(&self) -> Result<MirrorSnapshot, CoreError> {
        let status = MirrorSnapshot::from(self.inner.client.mirror_status().await?);
        self.inner
            .store
            .reconcile(Snapshot::Mirror(status.clone()), Source::Poll);
        Ok(status)
    }

    // ── Positions ────────────────────────────────────────────────

    pub async fn load_positions(&self) -> Result<PositionMap, CoreError> {
        match self.inner.client.positions().await {
            Ok(response) => {
                let map = PositionMap::from(response);
                self.inner
                    .store
                    .reconcile(Snapshot::Positions(map.clone()), Source::Poll);
                Ok(map)
            }
            Err(e) => {
                let err = CoreError::from(e);
                self.inner
                    .store
                    .reconcile(Snapshot::PositionsFailed(err.to_string()), Source::Poll);
                Err(err)
            }
        }
    }

    /// Save the whole mapping. The saved map becomes the store's value.
    pub async fn save_positions(&self, map: &PositionMap) -> Result<String, CoreError> {
        let response = self.inner.client.save_positions(&map.to_wire()).await?;
        self.inner
            .store
            .reconcile(Snapshot::Positions(map.clone()), Source::Poll);
        Ok(response.message)
    }

    /// Restore server defaults, then re-fetch instead of trusting the
    /// reset response.
    pub async fn reset_positions(&self) -> Result<PositionMap, CoreError> {
        self.inner.client.reset_positions().await?;
        self.load_positions().await
    }

    // ── Mirror commands ──────────────────────────────────────────

    pub async fn start_mirror(
        &self,
        request: MirrorStartRequest,
    ) -> Result<MirrorDispatch, CoreError> {
        let cmd = MirrorCommand::Start {
            fps: request.fps,
            brightness: request.brightness,
        };
        if self.try_socket(cmd).await {
            return Ok(MirrorDispatch::socket());
        }
        let ack = self.inner.client.start_mirror(&request).await?;
        Ok(self.http_dispatch(ack))
    }

    pub async fn stop_mirror(&self) -> Result<MirrorDispatch, CoreError> {
        if self.try_socket(MirrorCommand::Stop).await {
            return Ok(MirrorDispatch::socket());
        }
        let ack = self.inner.client.stop_mirror().await?;
        let mut dispatch = self.http_dispatch(ack);
        if dispatch.status.is_none() {
            dispatch.status = Some(self.publish_stopped());
        }
        Ok(dispatch)
    }

    pub async fn update_mirror_settings(
        &self,
        settings: MirrorSettings,
    ) -> Result<MirrorDispatch, CoreError> {
        if self.try_socket(MirrorCommand::Settings(settings)).await {
            return Ok(MirrorDispatch::socket());
        }
        let ack = self.inner.client.update_mirror_settings(&settings).await?;
        Ok(self.http_dispatch(ack))
    }

    /// Send over the socket if it is open. `false` means the caller must
    /// fall back to HTTP.
    async fn try_socket(&self, cmd: MirrorCommand) -> bool {
        let guard = self.inner.channel.lock().await;
        let Some(channel) = guard.as_ref() else {
            return false;
        };
        match channel.send(cmd) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "socket unavailable, falling back to HTTP");
                false
            }
        }
    }

    /// The stop ack carries only a message. A 2xx still means the mirror
    /// is off, so the last frame's colors must not stay live.
    fn publish_stopped(&self) -> MirrorSnapshot {
        let previous = self.inner.store.mirror();
        let stopped = MirrorSnapshot {
            running: false,
            fps: previous.as_ref().map_or(0, |s| s.fps),
            brightness: previous.as_ref().and_then(|s| s.brightness),
            colors: IndexMap::new(),
        };
        self.inner
            .store
            .reconcile(Snapshot::Mirror(stopped.clone()), Source::Poll);
        stopped
    }

    fn http_dispatch(&self, ack: lumen_api::models::MirrorAck) -> MirrorDispatch {
        let status = ack.status.map(MirrorSnapshot::from);
        if let Some(ref snapshot) = status {
            self.inner
                .store
                .reconcile(Snapshot::Mirror(snapshot.clone()), Source::Poll);
        }
        MirrorDispatch {
            route: CommandRoute::Http,
            message: ack.message,
            status,
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to mirror channel state changes. `TornDown` while no
    /// socket is open.
    pub fn channel_state(&self) -> watch::Receiver<ChannelState> {
        self.inner.channel_state.subscribe()
    }

    // ── Snapshot accessors (delegate to LiveStore) ───────────────

    pub fn lights_snapshot(&self) -> LightsView {
        self.inner.store.lights()
    }

    pub fn bridge_snapshot(&self) -> BridgeView {
        self.inner.store.bridge()
    }

    pub fn mirror_snapshot(&self) -> MirrorView {
        self.inner.store.mirror()
    }

    pub fn positions_snapshot(&self) -> PositionsView {
        self.inner.store.positions()
    }

    // ── Stream accessors (delegate to LiveStore) ─────────────────

    pub fn lights(&self) -> Subscription<LightsView> {
        self.inner.store.subscribe_lights()
    }

    pub fn bridge(&self) -> Subscription<BridgeView> {
        self.inner.store.subscribe_bridge()
    }

    pub fn mirror(&self) -> Subscription<MirrorView> {
        self.inner.store.subscribe_mirror()
    }

    pub fn positions(&self) -> Subscription<PositionsView> {
        self.inner.store.subscribe_positions()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Mirror status is not part of the periodic poll; the socket keeps it
/// current after this. Positions are loaded by whoever needs them.
async fn initial_mirror_status(controller: &Controller) {
    if let Err(e) = controller.mirror_status().await {
        warn!(error = %e, "initial mirror status failed");
    }
}

/// Forward socket frames into the store and mirror the channel state.
async fn channel_forward_task(
    controller: Controller,
    mut frames: broadcast::Receiver<Arc<MirrorStatus>>,
    mut states: watch::Receiver<ChannelState>,
) {
    let cancel = controller.inner.cancel.clone();
    let publish = |state: ChannelState| {
        controller.inner.channel_state.send_replace(state);
    };
    publish(*states.borrow_and_update());

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = states.changed() => {
                publish(*states.borrow_and_update());
                if changed.is_err() {
                    break;
                }
            }
            frame = frames.recv() => match frame {
                Ok(status) => {
                    let snapshot = MirrorSnapshot::from(MirrorStatus::clone(&status));
                    controller.inner.store.reconcile(Snapshot::Mirror(snapshot), Source::Push);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "mirror frames lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

/// Process commands from the mpsc channel.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    match cmd {
        Command::ApplyConfiguration(request) => {
            controller.apply(&request).await.map(CommandResult::Applied)
        }
        Command::StartMirror(request) => controller
            .start_mirror(request)
            .await
            .map(CommandResult::Mirror),
        Command::StopMirror => controller.stop_mirror().await.map(CommandResult::Mirror),
        Command::UpdateMirrorSettings(settings) => controller
            .update_mirror_settings(settings)
            .await
            .map(CommandResult::Mirror),
        Command::SavePositions(map) => controller
            .save_positions(&map)
            .await
            .map(|message| CommandResult::PositionsSaved { message }),
        Command::ResetPositions => controller
            .reset_positions()
            .await
            .map(CommandResult::PositionsReset),
    }
}
