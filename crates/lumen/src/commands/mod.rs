//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod bridge;
pub mod config_cmd;
pub mod configs;
pub mod lights;
pub mod mirror;
pub mod positions;
pub mod util;

use std::time::Duration;

use lumen_core::{BridgeConfig, Controller};

use crate::cli::{Command, GlobalOpts, LightsCommand, MirrorCommand};
use crate::error::CliError;

/// Fallback refresh period for `lights status --watch` when the profile
/// disables polling.
const WATCH_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Switch the background machinery on only for commands that stream.
/// Everything else is a single request-response cycle.
pub fn tune_for(cmd: &Command, mut config: BridgeConfig) -> BridgeConfig {
    let (poll, socket) = match cmd {
        Command::Lights(args) => (
            matches!(args.command, LightsCommand::Status { watch: true }),
            false,
        ),
        Command::Mirror(args) => (false, matches!(args.command, MirrorCommand::Watch)),
        _ => (false, false),
    };

    if poll {
        if config.poll_interval.is_zero() {
            config.poll_interval = WATCH_POLL_INTERVAL;
        }
    } else {
        config.poll_interval = Duration::ZERO;
    }
    config.websocket_enabled = socket;
    config
}

/// Dispatch a bridge-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Configs(args) => configs::handle(controller, args, global).await,
        Command::Lights(args) => lights::handle(controller, args, global).await,
        Command::Bridge(args) => bridge::handle(controller, args, global).await,
        Command::Positions(args) => positions::handle(controller, args, global).await,
        Command::Mirror(args) => mirror::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command reached the bridge dispatcher".into(),
        )),
    }
}
