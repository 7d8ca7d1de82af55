// ── Lights grid and bridge status line ──

use serde::Serialize;

use super::Tone;
use crate::model::{BridgeState, Light, LightState, Loadable, Position, PositionMap, Rgb};
use crate::sort::compare_names;
use crate::store::{BridgeView, LightsView};

/// One light as painted in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightTile {
    pub name: String,
    pub state: LightState,
    pub color: Rgb,
    pub hex: String,
    pub brightness_percent: u8,
    /// Assigned slot, if the positions mapping is loaded and names the light.
    pub position: Option<Position>,
}

/// What the lights area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightsPanel {
    Loading,
    Empty,
    Tiles(Vec<LightTile>),
    Error(String),
}

/// Tiles sorted by display name.
pub fn light_tiles(lights: &[Light], positions: Option<&PositionMap>) -> Vec<LightTile> {
    let mut sorted: Vec<&Light> = lights.iter().collect();
    sorted.sort_by(|a, b| compare_names(&a.name, &b.name));
    sorted
        .into_iter()
        .map(|light| LightTile {
            name: light.name.clone(),
            state: light.state(),
            color: light.color,
            hex: light.color.to_hex(),
            brightness_percent: light.brightness_percent(),
            position: positions
                .and_then(|map| map.light(&light.name))
                .map(|assignment| assignment.position),
        })
        .collect()
}

pub fn lights_panel(view: &LightsView, positions: Option<&PositionMap>) -> LightsPanel {
    match view {
        Loadable::Loading => LightsPanel::Loading,
        Loadable::Error(message) => LightsPanel::Error(message.clone()),
        Loadable::Ready(lights) if lights.is_empty() => LightsPanel::Empty,
        Loadable::Ready(lights) => LightsPanel::Tiles(light_tiles(lights, positions)),
    }
}

/// Bridge indicator text and tone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeLine {
    pub text: String,
    pub tone: Tone,
}

pub fn bridge_line(view: &BridgeView) -> BridgeLine {
    match view {
        Loadable::Loading => BridgeLine {
            text: "Checking bridge...".into(),
            tone: Tone::Pending,
        },
        Loadable::Ready(BridgeState::Connected { ip, light_count }) => BridgeLine {
            text: format!("Bridge connected ({ip}) - {light_count} lights"),
            tone: Tone::Good,
        },
        Loadable::Ready(BridgeState::Disconnected { .. }) => BridgeLine {
            text: "Bridge disconnected".into(),
            tone: Tone::Bad,
        },
        Loadable::Error(_) => BridgeLine {
            text: "Error checking connection".into(),
            tone: Tone::Bad,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::LightAssignment;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn light(name: &str, on: bool, reachable: bool) -> Light {
        Light {
            name: name.into(),
            color: Rgb::new(255, 128, 0),
            on,
            reachable,
            brightness: 254,
        }
    }

    #[test]
    fn tiles_are_sorted_and_classified() {
        let lights = vec![
            light("Lamp B", true, true),
            light("Lamp A", true, false),
            light("lamp c", false, true),
        ];
        let tiles = light_tiles(&lights, None);
        let names: Vec<&str> = tiles.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Lamp A", "Lamp B", "lamp c"]);
        assert_eq!(tiles[0].state, LightState::Unreachable);
        assert_eq!(tiles[1].state, LightState::On);
        assert_eq!(tiles[2].state, LightState::Off);
        assert_eq!(tiles[0].hex, "#ff8000");
        assert_eq!(tiles[0].brightness_percent, 100);
    }

    #[test]
    fn tiles_pick_up_assigned_positions() {
        let map = PositionMap {
            lights: vec![LightAssignment::new("Desk", true, Position::TopLeft)],
            slots: Vec::new(),
        };
        let tiles = light_tiles(&[light("Desk", true, true), light("Hall", true, true)], Some(&map));
        assert_eq!(tiles[0].position, Some(Position::TopLeft));
        assert_eq!(tiles[1].position, None);
    }

    #[test]
    fn panel_covers_every_load_state() {
        assert_eq!(lights_panel(&Loadable::Loading, None), LightsPanel::Loading);
        assert_eq!(
            lights_panel(&Loadable::Ready(Arc::new(Vec::new())), None),
            LightsPanel::Empty
        );
        assert_eq!(
            lights_panel(&Loadable::Error("timed out".into()), None),
            LightsPanel::Error("timed out".into())
        );
        let ready = Loadable::Ready(Arc::new(vec![light("Desk", true, true)]));
        assert!(matches!(lights_panel(&ready, None), LightsPanel::Tiles(t) if t.len() == 1));
    }

    #[test]
    fn bridge_line_texts() {
        let up = Loadable::Ready(BridgeState::Connected {
            ip: "10.0.0.2".into(),
            light_count: 4,
        });
        assert_eq!(bridge_line(&up).text, "Bridge connected (10.0.0.2) - 4 lights");
        assert_eq!(bridge_line(&up).tone, Tone::Good);

        let down = Loadable::Ready(BridgeState::Disconnected { reason: None });
        assert_eq!(bridge_line(&down).text, "Bridge disconnected");

        let err: BridgeView = Loadable::Error("refused".into());
        assert_eq!(bridge_line(&err).text, "Error checking connection");
        assert_eq!(bridge_line(&err).tone, Tone::Bad);
    }
}
