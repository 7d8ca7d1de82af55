//! User-facing failures of the `lumen` binary, rendered by miette.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use lumen_config::ConfigError;
use lumen_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the bridge facade at {url}")]
    #[diagnostic(
        code(lumen::connection_failed),
        help(
            "Check that the facade is running and reachable.\n\
             URL: {url}\n\
             Try: lumen bridge status --bridge <URL>"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{what} unavailable: {message}")]
    #[diagnostic(
        code(lumen::status_unavailable),
        help("The facade answered with an error or could not be reached. Retry with -v for details.")
    )]
    StatusUnavailable { what: String, message: String },

    #[error("Mirror channel closed")]
    #[diagnostic(
        code(lumen::channel_closed),
        help(
            "The socket gave up reconnecting. Start/stop commands still work over HTTP;\n\
             re-run `lumen mirror watch` once the facade is back."
        )
    )]
    ChannelClosed,

    #[error("Request timed out")]
    #[diagnostic(
        code(lumen::timeout),
        help("Increase timeout with --timeout or check facade responsiveness.")
    )]
    Timeout,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(lumen::not_found),
        help("Run: lumen {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Bridge facade error: {message}")]
    #[diagnostic(code(lumen::api_error))]
    ApiError { status: Option<u16>, message: String },

    #[error("Not found: {message}")]
    #[diagnostic(code(lumen::not_found))]
    Missing { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lumen::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(lumen::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: lumen config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No bridge facade configured")]
    #[diagnostic(
        code(lumen::no_config),
        help(
            "Create a profile with: lumen config init\n\
             Or pass --bridge <URL> / set LUMEN_BRIDGE.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(lumen::config))]
    Config(Box<figment::Error>),

    #[error("Could not save configuration: {message}")]
    #[diagnostic(code(lumen::config_write))]
    ConfigWrite { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(lumen::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(lumen::internal))]
    Internal(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Process exit status, see [`exit_code`].
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::StatusUnavailable { .. } | Self::ChannelClosed => {
                exit_code::CONNECTION
            }
            Self::NotFound { .. }
            | Self::Missing { .. }
            | Self::ProfileNotFound { .. }
            | Self::ApiError {
                status: Some(404),
                ..
            } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::BridgeUnreachable { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::ChannelNotOpen => CliError::ChannelClosed,

            CoreError::NotConnected => CliError::Internal("controller is not connected".into()),

            CoreError::NotFound { message } => CliError::Missing { message },

            CoreError::NoConfigurationSelected => CliError::Validation {
                field: "name".into(),
                reason: "no configuration selected".into(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
            other @ (ConfigError::Serialization(_) | ConfigError::Parse(_)) => {
                CliError::ConfigWrite {
                    message: other.to_string(),
                }
            }
        }
    }
}
