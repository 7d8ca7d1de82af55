//! `lumen-tui`: terminal control panel for a Hue lighting bridge.
//!
//! Built on [ratatui](https://ratatui.rs) with live views from
//! `lumen-core`'s store. Screens are navigable via number keys (1-4):
//! Lights, Configurations, Mirror, and Positions.
//!
//! Logs go to a file (default `lumen-tui.log` next to the state file) so
//! they never corrupt the terminal. A background data bridge task forwards
//! store updates into the TUI action loop.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use lumen_core::{BridgeConfig, Controller};

use crate::app::App;

const LOG_FILE_NAME: &str = "lumen-tui.log";

/// Terminal control panel for a Hue lighting bridge.
#[derive(Parser, Debug)]
#[command(name = "lumen-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short = 'p', long, env = "LUMEN_PROFILE")]
    profile: Option<String>,

    /// Bridge URL (e.g., http://192.168.1.20:8080); overrides the profile
    #[arg(short = 'b', long, env = "LUMEN_BRIDGE")]
    bridge: Option<String>,

    /// Log file path (defaults to lumen-tui.log beside the state file)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. Returns a guard that must live as long as the app
/// so buffered lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lumen_tui={log_level},lumen_core={log_level}")));

    let log_file = cli.log_file.clone().unwrap_or_else(default_log_file);
    let log_dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new(LOG_FILE_NAME));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

fn default_log_file() -> PathBuf {
    let state = lumen_config::state_path();
    let dir = state.parent().map_or_else(std::env::temp_dir, Path::to_path_buf);
    let _ = std::fs::create_dir_all(&dir);
    dir.join(LOG_FILE_NAME)
}

/// Resolve the bridge config: `--bridge` wins over the profile URL, and a
/// bare `--bridge` works without any config file.
fn build_config(cli: &Cli) -> Result<BridgeConfig> {
    let cfg = lumen_config::load_config().wrap_err("failed to load config")?;

    let bridge_url = cli
        .bridge
        .as_deref()
        .map(|raw| {
            raw.parse::<url::Url>()
                .map_err(|e| eyre!("invalid bridge URL '{raw}': {e}"))
        })
        .transpose()?;

    match (cfg.profile(cli.profile.as_deref()), bridge_url) {
        (Ok((name, profile)), url) => {
            let mut config = lumen_config::profile_to_bridge_config(profile, &name)?;
            if let Some(url) = url {
                config.url = url;
            }
            Ok(config)
        }
        (Err(_), Some(url)) if cli.profile.is_none() => {
            let mut config = BridgeConfig::new(url);
            config.timeout = Duration::from_secs(cfg.defaults.timeout);
            Ok(config)
        }
        (Err(e), _) => Err(eyre!(
            "{e}. Run `lumen config init` or pass --bridge <URL>"
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal switches to raw mode
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = build_config(&cli)?;
    info!(bridge = %config.url, "starting lumen-tui");

    theme::set_theme(lumen_config::load_theme());

    let controller = Controller::new(config)?;
    let mut app = App::new(controller);
    app.run().await?;

    Ok(())
}
