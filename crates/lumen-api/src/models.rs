// Bridge facade wire types
//
// Request and response shapes for the HTTP facade and the mirror socket.
// These mirror the JSON exactly; `lumen-core` converts them into domain
// types (positions as an enum, sorted light lists, etc.).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Configurations ───────────────────────────────────────────────────

/// A saved lighting preset from `GET /configurations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `POST /apply`.
///
/// `duration_minutes` is always serialized; `null` means the preset stays
/// applied until something else changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyConfigRequest {
    pub config_name: String,
    pub transition_time_secs: u32,
    pub duration_minutes: Option<u32>,
}

/// Echo of the applied parameters inside an [`ApplyResponse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyDetails {
    #[serde(default)]
    pub config_name: String,
    #[serde(default)]
    pub transition_time_secs: f64,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
}

/// Response of `POST /apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub message: String,
    #[serde(default)]
    pub details: ApplyDetails,
}

// ── Lights ───────────────────────────────────────────────────────────

/// RGB triple as reported by `/api/lights/status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// One light in the status listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightStatus {
    pub name: String,
    #[serde(default)]
    pub color: RgbColor,
    #[serde(default)]
    pub on: bool,
    #[serde(default)]
    pub reachable: bool,
    #[serde(default)]
    pub brightness: u8,
}

/// Envelope of `GET /api/lights/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightsStatusResponse {
    #[serde(default)]
    pub lights: Vec<LightStatus>,
}

/// `GET /api/bridge/status`.
///
/// Either `{connected: true, bridge_ip, light_count}` or
/// `{connected: false, error}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeStatus {
    pub connected: bool,
    #[serde(default)]
    pub bridge_ip: Option<String>,
    #[serde(default)]
    pub light_count: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Positions ────────────────────────────────────────────────────────

/// A light's slot assignment. `position` is the slot id (`"left"`, `"none"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightPosition {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_position")]
    pub position: String,
}

fn default_enabled() -> bool {
    true
}

fn default_position() -> String {
    "none".into()
}

/// Server-side description of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSlot {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// `GET /positions` and `POST /positions/reset`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionsResponse {
    #[serde(default)]
    pub lights: Vec<LightPosition>,
    #[serde(default)]
    pub positions: Vec<PositionSlot>,
}

/// Body of `POST /positions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePositionsRequest {
    pub lights: Vec<LightPosition>,
}

/// Generic `{message}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

// ── Mirror ───────────────────────────────────────────────────────────

/// Mirror status snapshot, from `GET /mirror/status` or a socket frame.
///
/// `colors` keeps the order the server sent. When `running` is false the
/// map is stale and must not be shown as live data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorStatus {
    pub running: bool,
    #[serde(default)]
    pub fps: u32,
    #[serde(default)]
    pub brightness: Option<u32>,
    #[serde(default)]
    pub colors: IndexMap<String, [u8; 3]>,
}

/// Body of `POST /mirror/start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorStartRequest {
    pub fps: u32,
    pub brightness: u32,
}

impl Default for MirrorStartRequest {
    fn default() -> Self {
        Self {
            fps: 25,
            brightness: 200,
        }
    }
}

/// Body of `POST /mirror/settings`. Unset fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MirrorSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation_boost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_time: Option<f64>,
}

/// Response of the mirror command endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorAck {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<MirrorStatus>,
}

/// Client → server message on `/ws/mirror`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum MirrorCommand {
    Start { fps: u32, brightness: u32 },
    Stop,
    Settings(MirrorSettings),
}
