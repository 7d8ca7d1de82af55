// ── Live state store ──
//
// Single reconciliation point for poll results and socket pushes. Each
// stream (lights, bridge, mirror, positions) is last-write-wins: a
// snapshot replaces whatever was there, regardless of which source
// produced it. Subscribers observe changes through `watch` channels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::trace;

use crate::model::{BridgeState, Light, Loadable, MirrorSnapshot, PositionMap};
use crate::sort::sort_lights;

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    Poll,
    Push,
}

/// A complete replacement value for one stream.
#[derive(Debug, Clone)]
pub enum Snapshot {
    Lights(Vec<Light>),
    LightsFailed(String),
    Bridge(BridgeState),
    BridgeFailed(String),
    Mirror(MirrorSnapshot),
    Positions(PositionMap),
    PositionsFailed(String),
}

impl Snapshot {
    fn stream(&self) -> &'static str {
        match self {
            Self::Lights(_) | Self::LightsFailed(_) => "lights",
            Self::Bridge(_) | Self::BridgeFailed(_) => "bridge",
            Self::Mirror(_) => "mirror",
            Self::Positions(_) | Self::PositionsFailed(_) => "positions",
        }
    }
}

pub type LightsView = Loadable<Arc<Vec<Light>>>;
pub type BridgeView = Loadable<BridgeState>;
pub type MirrorView = Option<Arc<MirrorSnapshot>>;
pub type PositionsView = Loadable<Arc<PositionMap>>;

/// Reactive store for everything the dashboard shows.
pub struct LiveStore {
    lights: watch::Sender<LightsView>,
    bridge: watch::Sender<BridgeView>,
    mirror: watch::Sender<MirrorView>,
    positions: watch::Sender<PositionsView>,
    last_poll: watch::Sender<Option<DateTime<Utc>>>,
    last_push: watch::Sender<Option<DateTime<Utc>>>,
}

impl LiveStore {
    pub fn new() -> Self {
        Self {
            lights: watch::Sender::new(Loadable::Loading),
            bridge: watch::Sender::new(Loadable::Loading),
            mirror: watch::Sender::new(None),
            positions: watch::Sender::new(Loadable::Loading),
            last_poll: watch::Sender::new(None),
            last_push: watch::Sender::new(None),
        }
    }

    // ── Reconciliation ───────────────────────────────────────────────

    /// Apply a snapshot. The newest write for a stream always wins; light
    /// lists are sorted by display name before they are published.
    pub fn reconcile(&self, snapshot: Snapshot, source: Source) {
        trace!(stream = snapshot.stream(), %source, "reconcile");
        match snapshot {
            Snapshot::Lights(mut lights) => {
                sort_lights(&mut lights);
                self.lights.send_replace(Loadable::Ready(Arc::new(lights)));
            }
            Snapshot::LightsFailed(message) => {
                self.lights.send_replace(Loadable::Error(message));
            }
            Snapshot::Bridge(state) => {
                self.bridge.send_replace(Loadable::Ready(state));
            }
            Snapshot::BridgeFailed(message) => {
                self.bridge.send_replace(Loadable::Error(message));
            }
            Snapshot::Mirror(status) => {
                self.mirror.send_replace(Some(Arc::new(status)));
            }
            Snapshot::Positions(map) => {
                self.positions.send_replace(Loadable::Ready(Arc::new(map)));
            }
            Snapshot::PositionsFailed(message) => {
                self.positions.send_replace(Loadable::Error(message));
            }
        }

        let stamp = match source {
            Source::Poll => &self.last_poll,
            Source::Push => &self.last_push,
        };
        stamp.send_replace(Some(Utc::now()));
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn lights(&self) -> LightsView {
        self.lights.borrow().clone()
    }

    pub fn bridge(&self) -> BridgeView {
        self.bridge.borrow().clone()
    }

    pub fn mirror(&self) -> MirrorView {
        self.mirror.borrow().clone()
    }

    pub fn positions(&self) -> PositionsView {
        self.positions.borrow().clone()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_lights(&self) -> Subscription<LightsView> {
        Subscription::new(self.lights.subscribe())
    }

    pub fn subscribe_bridge(&self) -> Subscription<BridgeView> {
        Subscription::new(self.bridge.subscribe())
    }

    pub fn subscribe_mirror(&self) -> Subscription<MirrorView> {
        Subscription::new(self.mirror.subscribe())
    }

    pub fn subscribe_positions(&self) -> Subscription<PositionsView> {
        Subscription::new(self.positions.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_poll(&self) -> Option<DateTime<Utc>> {
        *self.last_poll.borrow()
    }

    pub fn last_push(&self) -> Option<DateTime<Utc>> {
        *self.last_push.borrow()
    }

    /// How long ago the last poll landed, or `None` if never polled.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_poll().map(|t| Utc::now() - t)
    }
}

impl Default for LiveStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Subscription ─────────────────────────────────────────────────────

/// A subscription to one stream of the store.
///
/// Provides both point-in-time access and change notification via
/// [`changed`](Self::changed).
pub struct Subscription<T: Clone> {
    current: T,
    receiver: watch::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    fn new(mut receiver: watch::Receiver<T>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The value captured at creation or at the last `changed()`.
    pub fn current(&self) -> &T {
        &self.current
    }

    /// The latest value (may have changed since creation).
    pub fn latest(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new value.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        let value = self.receiver.borrow_and_update().clone();
        self.current = value.clone();
        Some(value)
    }
}
