// ── Core error types ──
//
// User-facing errors from lumen-core. Consumers never see raw HTTP
// transport errors or JSON parse failures directly; the
// `From<lumen_api::Error>` impl translates them into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach bridge facade at {url}: {reason}")]
    BridgeUnreachable { url: String, reason: String },

    #[error("Bridge request timed out")]
    Timeout,

    #[error("Mirror channel is not open")]
    ChannelNotOpen,

    #[error("Controller is not connected")]
    NotConnected,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("No configuration selected")]
    NoConfigurationSelected,

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Bridge error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` for failures the next poll tick may recover from.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::BridgeUnreachable { .. } | Self::Timeout | Self::ChannelNotOpen
        ) || matches!(self, Self::Api { status: Some(s), .. } if *s >= 500)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lumen_api::Error> for CoreError {
    fn from(err: lumen_api::Error) -> Self {
        match err {
            lumen_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::BridgeUnreachable {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            lumen_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            lumen_api::Error::Tls(msg) => CoreError::BridgeUnreachable {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            lumen_api::Error::Api {
                status: 404,
                message,
            } => CoreError::NotFound { message },
            lumen_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            lumen_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            lumen_api::Error::WebSocketConnect(reason) => CoreError::BridgeUnreachable {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            lumen_api::Error::ChannelNotOpen => CoreError::ChannelNotOpen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_404_becomes_not_found() {
        let err = CoreError::from(lumen_api::Error::Api {
            status: 404,
            message: "Configuração 'x' não encontrada".into(),
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn server_errors_are_transient() {
        let err = CoreError::from(lumen_api::Error::Api {
            status: 503,
            message: "busy".into(),
        });
        assert!(err.is_transient());
        assert!(CoreError::from(lumen_api::Error::ChannelNotOpen).is_transient());
    }
}
