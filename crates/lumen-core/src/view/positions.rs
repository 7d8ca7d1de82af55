// ── Position board ──

use serde::Serialize;

use crate::model::{Position, PositionMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightCard {
    pub name: String,
    pub enabled: bool,
    pub position: Position,
    /// Catalogue label, or "Not set" when the slot is not in the catalogue.
    pub label: String,
}

/// Enabled lights in one directional slot of the monitor outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotCount {
    pub position: Position,
    pub count: usize,
}

/// Card for `none`, `center` or `ambient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialCard {
    pub position: Position,
    pub label: String,
    pub description: String,
    /// Enabled lights at this slot; empty renders as "no lights".
    pub lights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionBoard {
    /// One card per light, in server order.
    pub cards: Vec<LightCard>,
    /// All eight directional slots, including empty ones.
    pub slot_counts: Vec<SlotCount>,
    /// Special slots present in the catalogue, in catalogue order.
    pub specials: Vec<SpecialCard>,
}

pub fn position_board(map: &PositionMap) -> PositionBoard {
    let cards = map
        .lights
        .iter()
        .map(|l| LightCard {
            name: l.name.clone(),
            enabled: l.enabled,
            position: l.position,
            label: map.label(l.position).to_owned(),
        })
        .collect();

    let slot_counts = Position::directional()
        .map(|position| SlotCount {
            position,
            count: map.enabled_in(position).count(),
        })
        .collect();

    let specials = map
        .slots
        .iter()
        .filter(|slot| slot.id.is_special())
        .map(|slot| SpecialCard {
            position: slot.id,
            label: slot.label.clone(),
            description: slot.description.clone(),
            lights: slot_lights(map, slot.id)
                .into_iter()
                .map(str::to_owned)
                .collect(),
        })
        .collect();

    PositionBoard {
        cards,
        slot_counts,
        specials,
    }
}

/// Names of the enabled lights at `position`.
pub fn slot_lights(map: &PositionMap, position: Position) -> Vec<&str> {
    map.enabled_in(position).map(|l| l.name.as_str()).collect()
}
