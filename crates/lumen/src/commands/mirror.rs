//! Screen mirroring handlers.

use std::fmt::Write as _;

use lumen_core::view::{ColorPreview, color_preview, mirror_line};
use lumen_core::{
    ChannelState, Command as CoreCommand, Controller, MirrorSettings, MirrorSnapshot,
    MirrorStartRequest,
};

use crate::cli::{GlobalOpts, MirrorArgs, MirrorCommand, MirrorSettingsArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Rendering ───────────────────────────────────────────────────────

fn detail(snapshot: &MirrorSnapshot, colored: bool) -> String {
    let line = mirror_line(Some(snapshot));
    let mut out = output::toned(&line.text, line.tone, colored);
    if let Some(extra) = line.detail {
        let _ = write!(out, " - {extra}");
    }
    if let Some(brightness) = snapshot.brightness {
        let _ = write!(out, "\nBrightness: {brightness}");
    }
    match color_preview(Some(snapshot)) {
        ColorPreview::Inactive => out.push_str("\nNo live color data"),
        ColorPreview::Waiting => out.push_str("\nWaiting for colors..."),
        ColorPreview::Swatches(swatches) => {
            for s in swatches {
                let _ = write!(out, "\n  {}  {}", output::swatch(s.color, colored), s.name);
            }
        }
    }
    out
}

/// One line per frame for `mirror watch`.
fn frame_line(snapshot: &MirrorSnapshot, colored: bool) -> String {
    let stamp = chrono::Local::now().format("%H:%M:%S");
    let line = mirror_line(Some(snapshot));
    let mut out = format!("[{stamp}] {}", output::toned(&line.text, line.tone, colored));
    if let Some(extra) = line.detail {
        let _ = write!(out, " - {extra}");
    }
    if let ColorPreview::Swatches(swatches) = color_preview(Some(snapshot)) {
        for s in swatches {
            let _ = write!(out, "  {} {}", output::swatch(s.color, colored), s.name);
        }
    }
    out
}

fn plain_state(snapshot: &MirrorSnapshot) -> String {
    if snapshot.running {
        format!("running {}", snapshot.fps)
    } else {
        "stopped".into()
    }
}

// ── Settings validation ─────────────────────────────────────────────

fn check_range(field: &str, value: Option<f64>, min: f64, max: f64) -> Result<(), CliError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(CliError::Validation {
            field: field.into(),
            reason: format!("{v} is outside {min}..={max}"),
        }),
        _ => Ok(()),
    }
}

fn settings_from_args(args: &MirrorSettingsArgs) -> Result<MirrorSettings, CliError> {
    check_range("saturation-boost", args.saturation_boost, 0.5, 2.0)?;
    check_range("smoothing-factor", args.smoothing_factor, 0.0, 1.0)?;
    check_range("transition-time", args.transition_time, 0.0, 10.0)?;

    let settings = MirrorSettings {
        fps: args.fps,
        brightness: args.brightness,
        saturation_boost: args.saturation_boost,
        smoothing_factor: args.smoothing_factor,
        transition_time: args.transition_time,
    };
    if settings == MirrorSettings::default() {
        return Err(CliError::Validation {
            field: "settings".into(),
            reason: "nothing to change; pass at least one flag".into(),
        });
    }
    Ok(settings)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: MirrorArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let colored = output::should_color(&global.color);
    let command = match args.command {
        MirrorCommand::Status => {
            let snapshot = controller.mirror_status().await?;
            let out = output::render_single(
                &global.output,
                &snapshot,
                |s| detail(s, colored),
                plain_state,
            );
            output::print_output(&out, global.quiet);
            return Ok(());
        }
        MirrorCommand::Watch => return watch(controller, global).await,
        MirrorCommand::Start { fps, brightness } => {
            CoreCommand::StartMirror(MirrorStartRequest { fps, brightness })
        }
        MirrorCommand::Stop => CoreCommand::StopMirror,
        MirrorCommand::Settings(ref settings) => {
            CoreCommand::UpdateMirrorSettings(settings_from_args(settings)?)
        }
    };

    let result = controller.execute(command).await?;
    if !global.quiet {
        eprintln!("{}", result.summary());
    }
    Ok(())
}

/// Stream frames until Ctrl-C. Reconnects are reported on stderr; once
/// the socket gives up the command fails.
async fn watch(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let colored = output::should_color(&global.color);
    let mut frames = controller.mirror();
    let mut states = controller.channel_state();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => return Ok(()),

            changed = states.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let state = *states.borrow_and_update();
                if !global.quiet {
                    eprintln!("socket: {state}");
                }
                if state == ChannelState::ClosedTerminal {
                    return Err(CliError::ChannelClosed);
                }
            }

            next = frames.changed() => {
                let Some(view) = next else { return Ok(()) };
                let Some(snapshot) = view else { continue };
                let out = frame_record(&snapshot, &global.output, colored);
                output::print_output(&out, global.quiet);
            }
        }
    }
}

/// One streamed frame: a line for table, plain and JSON output, a
/// `---` document for YAML.
fn frame_record(snapshot: &MirrorSnapshot, format: &OutputFormat, colored: bool) -> String {
    match format {
        OutputFormat::Table => frame_line(snapshot, colored),
        OutputFormat::Plain => plain_state(snapshot),
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_line(snapshot),
        OutputFormat::Yaml => output::render_yaml_document(snapshot),
    }
}
