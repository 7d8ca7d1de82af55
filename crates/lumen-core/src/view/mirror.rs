// ── Mirror color preview and monitor regions ──
//
// Colors from a stopped mirror are stale: every renderer here treats
// `running == false` as "nothing live", never as data.

use std::collections::BTreeMap;

use serde::Serialize;

use super::Tone;
use crate::model::{MirrorSnapshot, Position, PositionMap, Rgb};

/// One live color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Swatch {
    pub name: String,
    pub color: Rgb,
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorPreview {
    /// Not running (or status unknown): show a placeholder.
    Inactive,
    /// Running but no colors sampled yet.
    Waiting,
    /// Live colors in frame order.
    Swatches(Vec<Swatch>),
}

pub fn color_preview(snapshot: Option<&MirrorSnapshot>) -> ColorPreview {
    let Some(colors) = snapshot.and_then(MirrorSnapshot::live_colors) else {
        return ColorPreview::Inactive;
    };
    if colors.is_empty() {
        return ColorPreview::Waiting;
    }
    ColorPreview::Swatches(
        colors
            .iter()
            .map(|(name, color)| Swatch {
                name: name.clone(),
                color: *color,
                hex: color.to_hex(),
            })
            .collect(),
    )
}

/// Color per screen region.
///
/// A region takes the color of an enabled light assigned to it; when
/// several lights share a region the one latest in the frame wins.
/// Lights without an entry in `positions`, disabled lights and lights
/// at `none` are ignored. Empty when not running.
pub fn monitor_regions(
    snapshot: Option<&MirrorSnapshot>,
    positions: Option<&PositionMap>,
) -> BTreeMap<Position, Rgb> {
    let mut regions = BTreeMap::new();
    let (Some(colors), Some(positions)) =
        (snapshot.and_then(MirrorSnapshot::live_colors), positions)
    else {
        return regions;
    };

    for (name, color) in colors {
        let Some(light) = positions.light(name) else {
            continue;
        };
        if light.enabled && light.position != Position::None {
            regions.insert(light.position, *color);
        }
    }
    regions
}

/// Headline for the mirror status card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorLine {
    pub text: String,
    pub detail: Option<String>,
    pub tone: Tone,
}

pub fn mirror_line(snapshot: Option<&MirrorSnapshot>) -> MirrorLine {
    match snapshot {
        Some(s) if s.running => MirrorLine {
            text: "Mirroring active".into(),
            detail: Some(format!("{} FPS", s.fps)),
            tone: Tone::Good,
        },
        Some(_) => MirrorLine {
            text: "Mirroring inactive".into(),
            detail: None,
            tone: Tone::Bad,
        },
        None => MirrorLine {
            text: "Mirroring inactive".into(),
            detail: None,
            tone: Tone::Pending,
        },
    }
}
