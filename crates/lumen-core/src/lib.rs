// lumen-core: Live status sync layer between lumen-api and consumers (CLI/TUI).

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod poller;
pub mod sort;
pub mod store;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult, CommandRoute, MirrorDispatch};
pub use config::{BridgeConfig, TlsVerification};
pub use controller::Controller;
pub use error::CoreError;
pub use poller::{RefreshOutcome, RefreshTimer, StatusPoller};
pub use store::{LiveStore, Snapshot, Source, Subscription};

pub use lumen_api::{ChannelState, ReconnectPolicy};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ApplyOutcome, ApplyRequest, BridgeState, Configuration, Light, LightAssignment, LightState,
    Loadable, MirrorSettings, MirrorSnapshot, MirrorStartRequest, Position, PositionMap,
    PositionSlot, Rgb, rgb_to_hex,
};
