// ── Wire → domain conversions ──
//
// Translates `lumen_api::models` into the canonical types in
// `crate::model`, and back where the bridge expects a body.

use std::str::FromStr;

use lumen_api::models as wire;
use tracing::warn;

use crate::model::{
    ApplyRequest, BridgeState, Configuration, Light, LightAssignment, MirrorSnapshot, Position,
    PositionMap, PositionSlot, Rgb,
};

impl From<wire::Configuration> for Configuration {
    fn from(c: wire::Configuration) -> Self {
        Self {
            name: c.name,
            description: c.description,
        }
    }
}

impl From<&ApplyRequest> for wire::ApplyConfigRequest {
    fn from(r: &ApplyRequest) -> Self {
        Self {
            config_name: r.config_name().to_owned(),
            transition_time_secs: r.transition_secs(),
            duration_minutes: r.duration_minutes(),
        }
    }
}

impl From<wire::RgbColor> for Rgb {
    fn from(c: wire::RgbColor) -> Self {
        Self::new(c.r, c.g, c.b)
    }
}

impl From<wire::LightStatus> for Light {
    fn from(l: wire::LightStatus) -> Self {
        Self {
            name: l.name,
            color: l.color.into(),
            on: l.on,
            reachable: l.reachable,
            brightness: l.brightness,
        }
    }
}

impl From<wire::BridgeStatus> for BridgeState {
    fn from(s: wire::BridgeStatus) -> Self {
        if s.connected {
            Self::Connected {
                ip: s.bridge_ip.unwrap_or_default(),
                light_count: s.light_count.unwrap_or(0),
            }
        } else {
            Self::Disconnected { reason: s.error }
        }
    }
}

impl From<wire::MirrorStatus> for MirrorSnapshot {
    fn from(s: wire::MirrorStatus) -> Self {
        Self {
            running: s.running,
            fps: s.fps,
            brightness: s.brightness,
            colors: s.colors.into_iter().map(|(k, v)| (k, Rgb::from(v))).collect(),
        }
    }
}

/// Parse a slot id. Unknown ids show as unassigned but keep the raw id
/// so a bulk save does not overwrite them.
fn parse_assignment(l: wire::LightPosition) -> LightAssignment {
    match Position::from_str(&l.position) {
        Ok(position) => LightAssignment::new(l.name, l.enabled, position),
        Err(_) => {
            warn!(light = %l.name, position = %l.position, "unknown position id, showing as none");
            LightAssignment {
                name: l.name,
                enabled: l.enabled,
                position: Position::None,
                raw_position: Some(l.position),
            }
        }
    }
}

impl From<wire::PositionsResponse> for PositionMap {
    fn from(r: wire::PositionsResponse) -> Self {
        let lights = r.lights.into_iter().map(parse_assignment).collect();

        let slots = r
            .positions
            .into_iter()
            .filter_map(|p| match Position::from_str(&p.id) {
                Ok(id) => Some(PositionSlot {
                    id,
                    label: p.label,
                    description: p.description,
                }),
                Err(_) => {
                    warn!(slot = %p.id, "skipping unknown slot in catalogue");
                    None
                }
            })
            .collect();

        Self { lights, slots }
    }
}

impl From<&LightAssignment> for wire::LightPosition {
    fn from(l: &LightAssignment) -> Self {
        Self {
            name: l.name.clone(),
            enabled: l.enabled,
            position: l.position_id(),
        }
    }
}

impl PositionMap {
    /// Body for `POST /positions`.
    pub fn to_wire(&self) -> Vec<wire::LightPosition> {
        self.lights.iter().map(wire::LightPosition::from).collect()
    }
}
