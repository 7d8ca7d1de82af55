// ── Bridge status ──

use serde::{Deserialize, Serialize};

/// Connection status between the facade and the physical bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BridgeState {
    Connected { ip: String, light_count: u32 },
    Disconnected { reason: Option<String> },
}

impl BridgeState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}
