// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller routes mirror commands over the live socket when it is open
// and falls back to the equivalent HTTP request otherwise.

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{
    ApplyOutcome, ApplyRequest, MirrorSettings, MirrorSnapshot, MirrorStartRequest, PositionMap,
};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against a bridge facade.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Configurations ───────────────────────────────────────────────
    ApplyConfiguration(ApplyRequest),

    // ── Mirror ───────────────────────────────────────────────────────
    StartMirror(MirrorStartRequest),
    StopMirror,
    UpdateMirrorSettings(MirrorSettings),

    // ── Positions ────────────────────────────────────────────────────
    SavePositions(PositionMap),
    ResetPositions,
}

/// How a mirror command reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CommandRoute {
    /// Sent as a message on the open mirror socket.
    Socket,
    /// Sent as a one-shot HTTP request.
    Http,
}

/// Outcome of a start / stop / settings request.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorDispatch {
    pub route: CommandRoute,
    /// Server message; empty for socket sends, which are not acknowledged.
    pub message: String,
    /// Mirror state after an HTTP call: the echoed status, or stopped
    /// after a message-only stop ack.
    pub status: Option<MirrorSnapshot>,
}

impl MirrorDispatch {
    pub(crate) fn socket() -> Self {
        Self {
            route: CommandRoute::Socket,
            message: String::new(),
            status: None,
        }
    }

    /// One-line summary for toasts and CLI output.
    pub fn summary(&self) -> String {
        if self.message.is_empty() {
            format!("Sent via {}", self.route)
        } else {
            self.message.clone()
        }
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Applied(ApplyOutcome),
    Mirror(MirrorDispatch),
    PositionsSaved { message: String },
    PositionsReset(PositionMap),
}

impl CommandResult {
    /// One-line summary for toasts and CLI output.
    pub fn summary(&self) -> String {
        match self {
            Self::Applied(outcome) => outcome.message.clone(),
            Self::Mirror(dispatch) => dispatch.summary(),
            Self::PositionsSaved { message } => message.clone(),
            Self::PositionsReset(map) => {
                format!("Positions reset ({} lights)", map.lights.len())
            }
        }
    }
}
