// ── Runtime connection configuration ──
//
// These types describe *how* to talk to a bridge facade. They never touch
// disk; the CLI/TUI build a `BridgeConfig` from a profile and hand it in.

use std::time::Duration;

use lumen_api::{ReconnectPolicy, TlsMode, TransportConfig};
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default; facades are usually plain HTTP.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs behind a reverse proxy).
    DangerAcceptInvalid,
}

/// Configuration for a single bridge facade.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Facade base URL (e.g., `http://192.168.1.20:8000`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout. Bounds how long a stalled fetch can hold the
    /// poller's in-flight guard.
    pub timeout: Duration,
    /// Light/bridge status refresh period. Zero disables the timer.
    pub poll_interval: Duration,
    /// Open the mirror socket on connect.
    pub websocket_enabled: bool,
    /// Mirror socket reconnection policy.
    pub reconnect: ReconnectPolicy,
}

impl BridgeConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(3),
            websocket_enabled: true,
            reconnect: ReconnectPolicy::default(),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_control_panel() {
        let config = BridgeConfig::new("http://127.0.0.1:8000".parse().unwrap());
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.reconnect.max_retries, 5);
        assert_eq!(config.reconnect.base_delay, Duration::from_secs(2));
        assert!(config.websocket_enabled);
        assert_eq!(config.transport().timeout, Duration::from_secs(30));
    }
}
