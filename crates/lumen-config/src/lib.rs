//! Shared configuration for the lumen CLI and TUI.
//!
//! TOML profiles, the persisted client state (theme preference), and
//! translation to `lumen_core::BridgeConfig`. Both binaries depend on
//! this crate; the CLI adds flag-aware wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lumen_core::{BridgeConfig, ReconnectPolicy, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("failed to parse state file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Contents of `config.toml`.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named bridge profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|p| (name.to_owned(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named bridge facade profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Facade base URL (e.g., "http://192.168.1.20:8000").
    pub bridge: String,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Light/bridge status refresh period in seconds. 0 disables polling.
    pub poll_interval_secs: Option<u64>,

    /// Open the mirror socket on connect.
    pub websocket: Option<bool>,

    /// Linear backoff step between socket reconnects, in milliseconds.
    pub reconnect_base_ms: Option<u64>,

    /// Reconnect attempts before giving up.
    pub max_reconnects: Option<u32>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "lumen", "lumen")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// `config.toml` in the platform config dir (`~/.config/lumen` on Linux).
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "lumen", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Resolve the client state file (`state.toml` in the platform data dir).
pub fn state_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "lumen", "state.toml"]),
        |dirs| dirs.data_dir().join("state.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Profiles from `config.toml` with `LUMEN_` overrides applied.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path`, then `LUMEN_` variables
/// (`LUMEN_DEFAULTS__TIMEOUT=5` sets `defaults.timeout`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LUMEN_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Like [`load_config`], but an unreadable file yields the defaults.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Write `cfg` back to [`config_path`], creating the directory.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    write_toml(path, cfg)
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(value)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile → BridgeConfig ──────────────────────────────────────────

/// Build a `BridgeConfig` from a profile, with no CLI flag overrides.
///
/// Unset fields take the control panel defaults: 30 s timeout, 3 s
/// polling, socket enabled, 2 s × 5 reconnects.
pub fn profile_to_bridge_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<BridgeConfig, ConfigError> {
    let url: url::Url = profile.bridge.parse().map_err(|_| ConfigError::Validation {
        field: format!("profiles.{profile_name}.bridge"),
        reason: format!("invalid URL: {}", profile.bridge),
    })?;

    let mut config = BridgeConfig::new(url);

    config.tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    if let Some(secs) = profile.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = profile.poll_interval_secs {
        config.poll_interval = Duration::from_secs(secs);
    }
    if let Some(enabled) = profile.websocket {
        config.websocket_enabled = enabled;
    }

    let defaults = ReconnectPolicy::default();
    config.reconnect = ReconnectPolicy {
        base_delay: profile
            .reconnect_base_ms
            .map_or(defaults.base_delay, Duration::from_millis),
        max_retries: profile.max_reconnects.unwrap_or(defaults.max_retries),
    };

    Ok(config)
}

// ── Client state (theme) ────────────────────────────────────────────

/// Color theme preference.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Contents of `state.toml`. Unknown keys are preserved on write.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientState {
    #[serde(default)]
    pub theme: Theme,

    #[serde(flatten)]
    pub other: toml::Table,
}

/// Read the state file. A missing file is the default state.
pub fn read_state(path: &Path) -> Result<ClientState, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(toml::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientState::default()),
        Err(e) => Err(e.into()),
    }
}

/// Persist `theme`, keeping any other keys already in the file.
pub fn write_theme(path: &Path, theme: Theme) -> Result<(), ConfigError> {
    let mut state = read_state(path).unwrap_or_default();
    state.theme = theme;
    write_toml(path, &state)
}

/// Theme stored at the canonical state path, or `Light` when absent or
/// unreadable.
pub fn load_theme() -> Theme {
    read_state(&state_path())
        .map(|s| s.theme)
        .unwrap_or_default()
}

pub fn save_theme(theme: Theme) -> Result<(), ConfigError> {
    write_theme(&state_path(), theme)
}
