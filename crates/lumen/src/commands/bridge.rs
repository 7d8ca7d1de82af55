//! Bridge status handler.

use lumen_core::view::bridge_line;
use lumen_core::{BridgeState, Controller, Loadable};

use crate::cli::{BridgeArgs, BridgeCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &Controller,
    args: BridgeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BridgeCommand::Status => {
            controller.refresh_bridge().await;
            let view = controller.bridge_snapshot();
            let state = match &view {
                Loadable::Ready(state) => state.clone(),
                Loadable::Error(message) => {
                    return Err(CliError::StatusUnavailable {
                        what: "Bridge status".into(),
                        message: message.clone(),
                    });
                }
                Loadable::Loading => {
                    return Err(CliError::Internal("bridge status was not fetched".into()));
                }
            };

            let colored = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &state,
                |_| {
                    let line = bridge_line(&view);
                    let mut text = output::toned(&line.text, line.tone, colored);
                    if let BridgeState::Disconnected {
                        reason: Some(reason),
                    } = &state
                    {
                        text = format!("{text}\n  {reason}");
                    }
                    text
                },
                |s| if s.is_connected() { "connected" } else { "disconnected" }.into(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
