// ── View renderers ──
//
// Pure functions from store snapshots to view models. Front ends paint
// these; nothing here performs I/O, and the same input always yields
// the same output.

pub mod lights;
pub mod mirror;
pub mod positions;

pub use lights::{BridgeLine, LightTile, LightsPanel, bridge_line, light_tiles, lights_panel};
pub use mirror::{ColorPreview, MirrorLine, Swatch, color_preview, mirror_line, monitor_regions};
pub use positions::{LightCard, PositionBoard, SlotCount, SpecialCard, position_board, slot_lights};

/// Coarse tone for status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Tone {
    Good,
    Bad,
    Pending,
}
