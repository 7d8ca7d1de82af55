//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::str::FromStr;

use lumen_core::{Command, Controller, CoreError, Position, PositionMap};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the operation is
/// refused instead of hanging.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse a position id such as `top-left`.
pub fn parse_position(raw: &str) -> Result<Position, CliError> {
    Position::from_str(raw.trim()).map_err(|_| CliError::Validation {
        field: "position".into(),
        reason: format!(
            "unknown position '{raw}', expected one of: {}",
            Position::all()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    })
}

/// Fail with a listing hint unless the mapping names `light`.
pub fn require_light(map: &PositionMap, light: &str) -> Result<(), CliError> {
    if map.light(light).is_some() {
        Ok(())
    } else {
        Err(CliError::NotFound {
            resource_type: "light".into(),
            identifier: light.into(),
            list_command: "positions list".into(),
        })
    }
}

/// Load the mapping, apply `edit`, save it back. Returns the server message.
pub async fn edit_positions(
    controller: &Controller,
    light: &str,
    edit: impl FnOnce(&mut PositionMap) -> Result<(), CoreError>,
) -> Result<String, CliError> {
    let mut map = controller.load_positions().await?;
    require_light(&map, light)?;
    edit(&mut map)?;
    let result = controller.execute(Command::SavePositions(map)).await?;
    Ok(result.summary())
}
