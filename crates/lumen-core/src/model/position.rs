// ── Light positions ──
//
// Each light maps to one screen slot for the mirror feature. Directional
// slots sample a screen edge or corner; `center` and `ambient` sample
// larger areas; `none` leaves the light out of mirroring.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::error::CoreError;

/// Label shown for a light whose slot is missing from the catalogue.
pub const UNKNOWN_POSITION_LABEL: &str = "Not set";

/// A screen slot.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Position {
    None,
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
    Ambient,
}

impl Position {
    /// `none`, `center` and `ambient` are not screen edges and get their
    /// own cards instead of a slot on the monitor outline.
    pub fn is_special(self) -> bool {
        matches!(self, Self::None | Self::Center | Self::Ambient)
    }

    pub fn is_directional(self) -> bool {
        !self.is_special()
    }

    /// Every id, in catalogue order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    pub fn directional() -> impl Iterator<Item = Self> {
        Self::iter().filter(|p| p.is_directional())
    }
}

/// One light's assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightAssignment {
    pub name: String,
    pub enabled: bool,
    pub position: Position,
    /// Slot id from the bridge that this client does not recognise.
    /// `position` is `None` meanwhile; saving writes the raw id back
    /// until the light is reassigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_position: Option<String>,
}

impl LightAssignment {
    pub fn new(name: impl Into<String>, enabled: bool, position: Position) -> Self {
        Self {
            name: name.into(),
            enabled,
            position,
            raw_position: None,
        }
    }

    /// Id sent on save.
    pub fn position_id(&self) -> String {
        self.raw_position
            .clone()
            .unwrap_or_else(|| self.position.to_string())
    }

    fn reassign(&mut self, position: Position) {
        self.position = position;
        self.raw_position = None;
    }
}

/// Server-provided description of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSlot {
    pub id: Position,
    pub label: String,
    pub description: String,
}

/// The full mapping as loaded from the bridge, editable in memory and
/// saved back in bulk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMap {
    pub lights: Vec<LightAssignment>,
    pub slots: Vec<PositionSlot>,
}

impl PositionMap {
    pub fn light(&self, name: &str) -> Option<&LightAssignment> {
        self.lights.iter().find(|l| l.name == name)
    }

    fn light_mut(&mut self, name: &str) -> Result<&mut LightAssignment, CoreError> {
        self.lights
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| CoreError::NotFound {
                message: format!("light {name:?} has no position entry"),
            })
    }

    /// Flip a light's enabled flag, returning the new value.
    pub fn toggle(&mut self, name: &str) -> Result<bool, CoreError> {
        let light = self.light_mut(name)?;
        light.enabled = !light.enabled;
        Ok(light.enabled)
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), CoreError> {
        self.light_mut(name)?.enabled = enabled;
        Ok(())
    }

    pub fn assign(&mut self, name: &str, position: Position) -> Result<(), CoreError> {
        self.light_mut(name)?.reassign(position);
        Ok(())
    }

    /// Move a light to the next (or previous) slot in catalogue order,
    /// wrapping around. Returns the new position.
    pub fn cycle(&mut self, name: &str, forward: bool) -> Result<Position, CoreError> {
        let order = self.slot_order();
        let light = self.light_mut(name)?;
        let len = order.len();
        let idx = order.iter().position(|p| *p == light.position).unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        light.reassign(order[next]);
        Ok(light.position)
    }

    /// Slots in catalogue order, or every slot if the catalogue is empty.
    pub fn slot_order(&self) -> Vec<Position> {
        if self.slots.is_empty() {
            Position::iter().collect()
        } else {
            self.slots.iter().map(|s| s.id).collect()
        }
    }

    pub fn slot(&self, position: Position) -> Option<&PositionSlot> {
        self.slots.iter().find(|s| s.id == position)
    }

    /// Catalogue label for a slot, or [`UNKNOWN_POSITION_LABEL`].
    pub fn label(&self, position: Position) -> &str {
        self.slot(position)
            .map_or(UNKNOWN_POSITION_LABEL, |s| s.label.as_str())
    }

    /// Enabled lights assigned to `position`, in list order.
    pub fn enabled_in(&self, position: Position) -> impl Iterator<Item = &LightAssignment> {
        self.lights
            .iter()
            .filter(move |l| l.enabled && l.position == position)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn map() -> PositionMap {
        PositionMap {
            lights: vec![
                LightAssignment::new("Strip", true, Position::Left),
                LightAssignment::new("Bulb", false, Position::None),
            ],
            slots: vec![
                PositionSlot {
                    id: Position::None,
                    label: "None".into(),
                    description: String::new(),
                },
                PositionSlot {
                    id: Position::Left,
                    label: "Left".into(),
                    description: String::new(),
                },
                PositionSlot {
                    id: Position::Right,
                    label: "Right".into(),
                    description: String::new(),
                },
            ],
        }
    }

    #[test]
    fn ids_round_trip_as_kebab_case() {
        assert_eq!(Position::TopLeft.to_string(), "top-left");
        assert_eq!(Position::from_str("bottom-right").unwrap(), Position::BottomRight);
        assert!(Position::from_str("sideways").is_err());
        assert_eq!(Position::iter().count(), 11);
        assert_eq!(Position::directional().count(), 8);
    }

    #[test]
    fn toggle_and_assign_edit_in_place() {
        let mut m = map();
        assert!(m.toggle("Bulb").unwrap());
        m.assign("Bulb", Position::Right).unwrap();
        assert_eq!(m.light("Bulb").unwrap().position, Position::Right);
        assert!(matches!(m.toggle("Ghost"), Err(CoreError::NotFound { .. })));
    }

    #[test]
    fn cycle_follows_catalogue_and_wraps() {
        let mut m = map();
        assert_eq!(m.cycle("Strip", true).unwrap(), Position::Right);
        assert_eq!(m.cycle("Strip", true).unwrap(), Position::None);
        assert_eq!(m.cycle("Strip", false).unwrap(), Position::Right);
    }

    #[test]
    fn unknown_slot_label_falls_back() {
        let m = map();
        assert_eq!(m.label(Position::Left), "Left");
        assert_eq!(m.label(Position::Ambient), UNKNOWN_POSITION_LABEL);
    }
}
