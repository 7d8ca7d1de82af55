//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;

use lumen_core::store::{BridgeView, LightsView, MirrorView, PositionsView};
use lumen_core::{ChannelState, Configuration, MirrorSettings, MirrorStartRequest, PositionMap};

use crate::screen::ScreenId;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Pending confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    ResetPositions,
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResetPositions => f.write_str("Reset all positions to the defaults?"),
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,
    ToggleTheme,

    // ── Data events (from the controller streams) ─────────────────
    LightsUpdated(LightsView),
    BridgeUpdated(BridgeView),
    MirrorUpdated(MirrorView),
    PositionsUpdated(PositionsView),
    ChannelStateChanged(ChannelState),
    ConfigurationsLoaded(Vec<Configuration>),
    ConfigurationsFailed(String),

    // ── Requests ──────────────────────────────────────────────────
    RefreshLights,
    LoadConfigurations,
    ApplyConfiguration {
        name: String,
        transition: String,
        duration: String,
    },
    StartMirror(MirrorStartRequest),
    StopMirror,
    UpdateMirrorSettings(MirrorSettings),
    SavePositions(PositionMap),
    ReloadPositions,

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}

impl Action {
    /// Store updates every screen must see, not just the active one.
    pub fn is_data(&self) -> bool {
        matches!(
            self,
            Self::LightsUpdated(_)
                | Self::BridgeUpdated(_)
                | Self::MirrorUpdated(_)
                | Self::PositionsUpdated(_)
                | Self::ChannelStateChanged(_)
                | Self::ConfigurationsLoaded(_)
                | Self::ConfigurationsFailed(_)
        )
    }
}
