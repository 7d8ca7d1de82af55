// ── Status poller ──
//
// Periodic fetch of light and bridge status. Each fetch has its own
// in-flight guard: a call that arrives while the previous one is still
// outstanding returns `Skipped` immediately and is not queued.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lumen_api::BridgeClient;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{BridgeState, Light};
use crate::store::{LiveStore, Snapshot, Source};

/// What a refresh call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RefreshOutcome {
    /// Fetched and published.
    Refreshed,
    /// Fetch failed; the store now shows the error.
    Failed,
    /// A fetch was already in flight; nothing was done.
    Skipped,
}

// ── In-flight guard ──────────────────────────────────────────────────

#[derive(Debug, Default)]
struct InFlight(AtomicBool);

impl InFlight {
    fn try_enter(&self) -> Option<InFlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.0))
    }

    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the flag on drop, including when the fetch is cancelled or
/// panics.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ── StatusPoller ─────────────────────────────────────────────────────

/// Fetches status from the bridge and publishes it to the store.
pub struct StatusPoller {
    client: BridgeClient,
    store: Arc<LiveStore>,
    lights: InFlight,
    bridge: InFlight,
}

impl StatusPoller {
    pub fn new(client: BridgeClient, store: Arc<LiveStore>) -> Self {
        Self {
            client,
            store,
            lights: InFlight::default(),
            bridge: InFlight::default(),
        }
    }

    /// Replace the light list with a fresh fetch.
    pub async fn refresh_light_status(&self) -> RefreshOutcome {
        let Some(_guard) = self.lights.try_enter() else {
            debug!("light refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };

        match self.client.light_status().await {
            Ok(lights) => {
                let lights: Vec<Light> = lights.into_iter().map(Light::from).collect();
                debug!(count = lights.len(), "light status refreshed");
                self.store.reconcile(Snapshot::Lights(lights), Source::Poll);
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "light status refresh failed");
                self.store
                    .reconcile(Snapshot::LightsFailed(err.to_string()), Source::Poll);
                RefreshOutcome::Failed
            }
        }
    }

    /// Fetch the facade's connection to the physical bridge.
    pub async fn refresh_bridge_status(&self) -> RefreshOutcome {
        let Some(_guard) = self.bridge.try_enter() else {
            debug!("bridge refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };

        match self.client.bridge_status().await {
            Ok(status) => {
                self.store
                    .reconcile(Snapshot::Bridge(BridgeState::from(status)), Source::Poll);
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "bridge status refresh failed");
                self.store
                    .reconcile(Snapshot::BridgeFailed(err.to_string()), Source::Poll);
                RefreshOutcome::Failed
            }
        }
    }

    /// Both refreshes, concurrently.
    pub async fn refresh_all(&self) -> (RefreshOutcome, RefreshOutcome) {
        tokio::join!(self.refresh_light_status(), self.refresh_bridge_status())
    }

    /// `true` while a light fetch is outstanding.
    pub fn lights_in_flight(&self) -> bool {
        self.lights.is_set()
    }
}

// ── RefreshTimer ─────────────────────────────────────────────────────

/// A replaceable periodic timer.
///
/// Starting it while it is running cancels the previous schedule first,
/// so at most one schedule is ever active. Each tick spawns its own task;
/// ticks never wait for the previous one to finish.
#[derive(Debug, Default)]
pub struct RefreshTimer {
    current: Mutex<Option<CancellationToken>>,
}

impl RefreshTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `tick` every `period`, starting immediately.
    pub fn start<F, Fut>(&self, period: Duration, tick: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.slot().replace(token.clone()) {
            previous.cancel();
            debug!("replaced running refresh timer");
        }

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = interval.tick() => {
                        tokio::spawn(tick());
                    }
                }
            }
        });
    }

    pub fn stop(&self) {
        if let Some(token) = self.slot().take() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.slot().as_ref().is_some_and(|t| !t.is_cancelled())
    }

    fn slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting(counter: &Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<()> + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let flag = InFlight::default();
        let guard = flag.try_enter();
        assert!(guard.is_some());
        assert!(flag.try_enter().is_none());
        drop(guard);
        assert!(!flag.is_set());
        assert!(flag.try_enter().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_replaces_the_previous_schedule() {
        let timer = RefreshTimer::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        timer.start(Duration::from_secs(3), counting(&first));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);

        timer.start(Duration::from_secs(3), counting(&second));
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert!(second.load(Ordering::SeqCst) >= 3);
        assert!(timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticks() {
        let timer = RefreshTimer::new();
        let count = Arc::new(AtomicUsize::new(0));

        timer.start(Duration::from_secs(1), counting(&count));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        timer.stop();
        let seen = count.load(Ordering::SeqCst);
        assert!(!timer.is_running());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }
}
