//! Data bridge: connects [`Controller`] streams to TUI actions.
//!
//! Runs as a background task. Connects the controller, pushes the current
//! snapshots, kicks off the one-time loads (configurations, positions),
//! then forwards every store change and socket state transition as an
//! [`Action`] until cancelled.

use lumen_core::Controller;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::action::{Action, Notification};

pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    if let Err(e) = controller.connect().await {
        warn!(error = %e, "failed to start controller");
        let _ = action_tx.send(Action::Notify(Notification::error(format!("{e}"))));
        return;
    }

    let mut lights = controller.lights();
    let mut bridge = controller.bridge();
    let mut mirror = controller.mirror();
    let mut positions = controller.positions();
    let mut channel = controller.channel_state();

    // Initial snapshots so screens paint immediately
    let _ = action_tx.send(Action::LightsUpdated(lights.latest()));
    let _ = action_tx.send(Action::BridgeUpdated(bridge.latest()));
    let _ = action_tx.send(Action::MirrorUpdated(mirror.latest()));
    let _ = action_tx.send(Action::PositionsUpdated(positions.latest()));
    let _ = action_tx.send(Action::ChannelStateChanged(*channel.borrow_and_update()));

    // Neither is part of the periodic poll
    let _ = action_tx.send(Action::LoadConfigurations);
    let _ = action_tx.send(Action::ReloadPositions);

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(view) = lights.changed() => {
                let _ = action_tx.send(Action::LightsUpdated(view));
            }
            Some(view) = bridge.changed() => {
                let _ = action_tx.send(Action::BridgeUpdated(view));
            }
            Some(view) = mirror.changed() => {
                let _ = action_tx.send(Action::MirrorUpdated(view));
            }
            Some(view) = positions.changed() => {
                let _ = action_tx.send(Action::PositionsUpdated(view));
            }
            Ok(()) = channel.changed() => {
                let state = *channel.borrow_and_update();
                debug!(%state, "mirror channel state");
                let _ = action_tx.send(Action::ChannelStateChanged(state));
            }
            else => break,
        }
    }

    debug!("data bridge shut down");
}
