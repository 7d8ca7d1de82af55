// ── Light domain types ──

use serde::{Deserialize, Serialize};

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`, lowercase.
    pub fn to_hex(self) -> String {
        rgb_to_hex(self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Format a color as `#rrggbb` with two lowercase hex digits per channel.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Visual state of a light. Exactly one applies; unreachable wins over
/// the on/off flag because that flag is stale for a light the bridge
/// cannot reach.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LightState {
    On,
    Off,
    Unreachable,
}

impl LightState {
    pub fn classify(on: bool, reachable: bool) -> Self {
        match (reachable, on) {
            (false, _) => Self::Unreachable,
            (true, true) => Self::On,
            (true, false) => Self::Off,
        }
    }
}

/// A light as last reported by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    pub name: String,
    pub color: Rgb,
    pub on: bool,
    pub reachable: bool,
    /// Raw bridge brightness, 0-254.
    pub brightness: u8,
}

impl Light {
    pub fn state(&self) -> LightState {
        LightState::classify(self.on, self.reachable)
    }

    /// Brightness as a 0-100 percentage of the bridge's 254 maximum.
    pub fn brightness_percent(&self) -> u8 {
        let pct = (u32::from(self.brightness.min(254)) * 100 + 127) / 254;
        u8::try_from(pct).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_zero_padded_lowercase() {
        assert_eq!(rgb_to_hex(0, 0, 0), "#000000");
        assert_eq!(rgb_to_hex(255, 10, 171), "#ff0aab");
        assert_eq!(Rgb::from([1, 2, 3]).to_hex(), "#010203");
    }

    #[test]
    fn unreachable_dominates_on_off() {
        for on in [true, false] {
            assert_eq!(LightState::classify(on, false), LightState::Unreachable);
        }
        assert_eq!(LightState::classify(true, true), LightState::On);
        assert_eq!(LightState::classify(false, true), LightState::Off);
    }

    #[test]
    fn brightness_percent_rounds() {
        let mut light = Light {
            name: "Desk".into(),
            color: Rgb::default(),
            on: true,
            reachable: true,
            brightness: 254,
        };
        assert_eq!(light.brightness_percent(), 100);
        light.brightness = 127;
        assert_eq!(light.brightness_percent(), 50);
        light.brightness = 0;
        assert_eq!(light.brightness_percent(), 0);
    }
}
