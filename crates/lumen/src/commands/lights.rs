//! Light status handlers.

use tabled::Tabled;
use tracing::debug;

use lumen_core::view::{LightTile, LightsPanel, lights_panel};
use lumen_core::{Controller, Loadable, PositionMap};

use crate::cli::{GlobalOpts, LightsArgs, LightsCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
    #[tabled(rename = "Position")]
    position: String,
}

fn light_row(tile: &LightTile, colored: bool) -> LightRow {
    LightRow {
        name: tile.name.clone(),
        state: tile.state.to_string(),
        color: output::swatch(tile.color, colored),
        brightness: format!("{}%", tile.brightness_percent),
        position: tile.position.map_or_else(|| "-".into(), |p| p.to_string()),
    }
}

// ── Rendering ───────────────────────────────────────────────────────

fn render(panel: LightsPanel, global: &GlobalOpts) -> Result<String, CliError> {
    let tiles = match panel {
        LightsPanel::Tiles(tiles) => tiles,
        LightsPanel::Empty if matches!(global.output, OutputFormat::Table) => {
            return Ok("No lights found".into());
        }
        LightsPanel::Empty => Vec::new(),
        LightsPanel::Error(message) => {
            return Err(CliError::StatusUnavailable {
                what: "Light status".into(),
                message,
            });
        }
        LightsPanel::Loading => {
            return Err(CliError::Internal("light status was not fetched".into()));
        }
    };
    let colored = output::should_color(&global.color);
    Ok(output::render_list(
        &global.output,
        &tiles,
        |t| light_row(t, colored),
        |t| t.name.clone(),
    ))
}

/// Positions only decorate the table; a facade without them still works.
async fn positions_if_available(controller: &Controller) -> Option<PositionMap> {
    match controller.load_positions().await {
        Ok(map) => Some(map),
        Err(e) => {
            debug!(error = %e, "positions unavailable, omitting column");
            None
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: LightsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LightsCommand::Status { watch: false } => {
            let (positions, _) =
                tokio::join!(positions_if_available(controller), controller.refresh_lights());
            let panel = lights_panel(&controller.lights_snapshot(), positions.as_ref());
            let out = render(panel, global)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        LightsCommand::Status { watch: true } => watch(controller, global).await,
    }
}

/// Print every published light list until Ctrl-C. Failed fetches are
/// reported and the poller keeps going.
async fn watch(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let positions = positions_if_available(controller).await;
    let mut lights = controller.lights();
    let table = matches!(global.output, OutputFormat::Table);

    let print = |view: &lumen_core::store::LightsView| {
        let panel = lights_panel(view, positions.as_ref());
        match render(panel, global) {
            Ok(out) => {
                if table && !global.quiet {
                    println!("── {} ──", chrono::Local::now().format("%H:%M:%S"));
                }
                output::print_output(&out, global.quiet);
            }
            Err(e) => eprintln!("{e}"),
        }
    };

    if !matches!(lights.current(), Loadable::Loading) {
        print(lights.current());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => return Ok(()),
            next = lights.changed() => {
                let Some(view) = next else { return Ok(()) };
                print(&view);
            }
        }
    }
}
