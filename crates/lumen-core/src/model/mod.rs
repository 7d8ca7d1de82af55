// ── Domain model ──
//
// Canonical types the CLI and TUI depend on. Wire shapes from
// `lumen-api` are converted into these in `crate::convert`.

pub mod bridge;
pub mod configuration;
pub mod light;
pub mod mirror;
pub mod position;

// ── Re-exports ──────────────────────────────────────────────────────

pub use bridge::BridgeState;
pub use configuration::{ApplyOutcome, ApplyRequest, Configuration};
pub use light::{Light, LightState, Rgb, rgb_to_hex};
pub use mirror::{MirrorSettings, MirrorSnapshot, MirrorStartRequest};
pub use position::{LightAssignment, Position, PositionMap, PositionSlot};

/// A value fetched from the bridge: not yet loaded, loaded, or failed.
///
/// `Error` carries a user-facing message and replaces any previous value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Loadable<T> {
    #[default]
    Loading,
    Ready(T),
    Error(String),
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
