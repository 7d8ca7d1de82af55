//! CLI configuration -- thin wrapper around `lumen_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--bridge, --timeout, --insecure).

use std::time::Duration;

use lumen_core::{BridgeConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use lumen_config::{
    Config, Profile, Theme, config_path, load_config, save_config, save_theme, state_path,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the `BridgeConfig` for this invocation.
///
/// Precedence: flag / env > profile > built-in defaults. A `--bridge`
/// URL works without any config file.
pub fn build_bridge_config(global: &GlobalOpts) -> Result<BridgeConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let mut bridge = match (cfg.profiles.get(&profile_name), global.bridge.as_deref()) {
        (Some(profile), _) => {
            let mut bridge = lumen_config::profile_to_bridge_config(profile, &profile_name)?;
            if let Some(url) = global.bridge.as_deref() {
                bridge.url = parse_url(url)?;
            }
            bridge
        }
        (None, Some(url)) => {
            let mut bridge = BridgeConfig::new(parse_url(url)?);
            bridge.timeout = Duration::from_secs(cfg.defaults.timeout);
            bridge
        }
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(secs) = global.timeout {
        bridge.timeout = Duration::from_secs(secs);
    }
    if global.insecure {
        bridge.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(bridge)
}

fn parse_url(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "bridge".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}
