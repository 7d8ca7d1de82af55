//! Config subcommand handlers.

use dialoguer::{Confirm, Input};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, ThemeArg};
use crate::config::{self, Config, Profile, Theme};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn format_config(cfg: &Config) -> String {
    let body = toml::to_string_pretty(cfg)
        .unwrap_or_else(|e| format!("# could not render configuration: {e}"));
    format!(
        "# {}\n# theme state: {}\n\n{body}",
        config::config_path().display(),
        config::state_path().display()
    )
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

#[allow(clippy::ptr_arg)]
fn validate_url(input: &String) -> Result<(), String> {
    input
        .parse::<url::Url>()
        .map(|_| ())
        .map_err(|e| format!("not a URL: {e}"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("lumen configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let bridge: String = Input::new()
                .with_prompt("Bridge facade URL")
                .default("http://127.0.0.1:8000".into())
                .validate_with(validate_url)
                .interact_text()
                .map_err(prompt_err)?;

            let poll_interval_secs: u64 = Input::new()
                .with_prompt("Status refresh interval (seconds, 0 disables)")
                .default(3)
                .interact_text()
                .map_err(prompt_err)?;

            let websocket = Confirm::new()
                .with_prompt("Use the live mirror socket?")
                .default(true)
                .interact()
                .map_err(prompt_err)?;

            let mut cfg = config::load_config().unwrap_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    bridge,
                    poll_interval_secs: Some(poll_interval_secs),
                    websocket: Some(websocket),
                    ..Profile::default()
                },
            );
            if cfg.profiles.len() == 1 || cfg.default_profile.is_none() {
                cfg.default_profile = Some(profile_name.clone());
            }
            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("\nProfile '{profile_name}' saved to {}", config_path.display());
                eprintln!("   Try: lumen bridge status");
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                let mut names: Vec<&str> = c.profiles.keys().map(String::as_str).collect();
                names.sort_unstable();
                names.join("\n")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetTheme { theme } => {
            let theme = match theme {
                ThemeArg::Light => Theme::Light,
                ThemeArg::Dark => Theme::Dark,
            };
            config::save_theme(theme)?;
            if !global.quiet {
                eprintln!("Theme set to {theme}");
            }
            Ok(())
        }
    }
}
